mod git;
mod output;

pub use git::Git2Provider;
pub use output::FileSystemOutput;
