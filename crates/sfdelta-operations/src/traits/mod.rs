mod git_provider;
mod output_writer;

pub use git_provider::GitProvider;
pub use output_writer::OutputWriter;
