use sfdelta_core::{ChangeRecord, Manifest};
use sfdelta_metadata::MetadataRegistry;

use super::*;
use crate::config::{DiffSettings, IgnoreRules, RunConfig};
use crate::metadata_diff::ContentDiff;
use crate::mocks::{MockGitProvider, RecordingWriter};

struct Fixture {
    registry: MetadataRegistry,
    writer: RecordingWriter,
    differ: ContentDiff,
}

impl Fixture {
    fn new() -> Self {
        Self {
            registry: MetadataRegistry::builtin().expect("built-in registry is valid"),
            writer: RecordingWriter::new(),
            differ: ContentDiff::new(DiffSettings::new(5, 2)).expect("worker pool starts"),
        }
    }

    fn run_on(&self, work: &mut Work, git: &MockGitProvider, records: &[ChangeRecord]) {
        let with = Collaborators {
            git,
            writer: &self.writer,
            differ: &self.differ,
        };
        let site_collection_types = work.config().site_collection_types().to_vec();
        let factory = HandlerFactory::new(&self.registry, &site_collection_types);
        for record in records {
            factory.handle(record, work, &with);
        }
    }

    fn run(&self, git: &MockGitProvider, config: RunConfig, records: &[ChangeRecord]) -> Work {
        let mut work = Work::new(config);
        self.run_on(&mut work, git, records);
        work
    }
}

fn delta_config() -> RunConfig {
    RunConfig::new("from", "to").with_generate_delta(true)
}

fn manifest(entries: &[(&str, &str)]) -> Manifest {
    entries.iter().copied().collect()
}

#[test]
fn selects_handler_kind_from_type_flags() {
    let registry = MetadataRegistry::builtin().expect("built-in registry is valid");
    let kind = |xml_name: &str| {
        HandlerKind::for_descriptor(registry.by_xml_name(xml_name).expect("type is registered"))
    };

    assert_eq!(kind("ApexClass"), HandlerKind::Standard);
    assert_eq!(kind("Report"), HandlerKind::Folder);
    assert_eq!(kind("LightningComponentBundle"), HandlerKind::Resource);
    assert_eq!(kind("PermissionSet"), HandlerKind::Container);
}

#[test]
fn unknown_paths_are_ignored() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file("to", "README.md", "# readme");

    let work = fixture.run(&git, delta_config(), &[ChangeRecord::added("README.md")]);

    assert!(work.to_add.is_empty());
    assert_eq!(fixture.writer.write_count(), 0);
}

#[test]
fn flat_type_copies_file_and_sidecar() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "force-app/main/default/classes/Foo.cls", "public class Foo {}")
        .with_file("to", "force-app/main/default/classes/Foo.cls-meta.xml", "<ApexClass/>");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::added("force-app/main/default/classes/Foo.cls")],
    );

    assert_eq!(work.to_add, manifest(&[("ApexClass", "Foo")]));
    assert!(work.to_destroy.is_empty());
    assert_eq!(
        fixture.writer.paths(),
        vec![
            "force-app/main/default/classes/Foo.cls",
            "force-app/main/default/classes/Foo.cls-meta.xml",
        ]
    );
}

#[test]
fn changed_sidecar_brings_its_primary_file() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "classes/Foo.cls", "public class Foo {}")
        .with_file("to", "classes/Foo.cls-meta.xml", "<ApexClass/>");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::modified("classes/Foo.cls-meta.xml")],
    );

    assert_eq!(work.to_add, manifest(&[("ApexClass", "Foo")]));
    assert_eq!(
        fixture.writer.paths(),
        vec!["classes/Foo.cls", "classes/Foo.cls-meta.xml"]
    );
}

#[test]
fn missing_sidecar_is_never_fabricated() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file("to", "classes/Foo.cls", "public class Foo {}");

    fixture.run(&git, delta_config(), &[ChangeRecord::modified("classes/Foo.cls")]);

    assert_eq!(fixture.writer.paths(), vec!["classes/Foo.cls"]);
}

#[test]
fn manifest_only_mode_writes_nothing() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file("to", "classes/Foo.cls", "public class Foo {}");

    let work = fixture.run(
        &git,
        RunConfig::new("from", "to"),
        &[ChangeRecord::added("classes/Foo.cls")],
    );

    assert_eq!(work.to_add, manifest(&[("ApexClass", "Foo")]));
    assert_eq!(fixture.writer.write_count(), 0);
}

#[test]
fn flat_deletion_lands_in_destroy() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new();

    let work = fixture.run(&git, delta_config(), &[ChangeRecord::deleted("classes/Foo.cls")]);

    assert!(work.to_add.is_empty());
    assert_eq!(work.to_destroy, manifest(&[("ApexClass", "Foo")]));
}

#[test]
fn excluded_type_is_only_handled_through_its_sidecar() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new();

    let work = fixture.run(
        &git,
        delta_config(),
        &[
            ChangeRecord::added("settings/Account.settings"),
            ChangeRecord::added("settings/Case.settings-meta.xml"),
        ],
    );

    assert_eq!(work.to_add, manifest(&[("Settings", "Case")]));
}

#[test]
fn folder_type_copies_every_folder_descriptor() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "reports/MyFolder.reportFolder-meta.xml", "<ReportFolder/>")
        .with_file("to", "reports/MyFolder/Sub.reportFolder-meta.xml", "<ReportFolder/>")
        .with_file("to", "reports/MyFolder/Sub/MyReport.report", "<Report/>")
        .with_file("to", "reports/MyFolder/Sub/Other.report", "<Report/>");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::added("reports/MyFolder/Sub/MyReport.report")],
    );

    assert_eq!(work.to_add, manifest(&[("Report", "MyFolder/Sub/MyReport")]));
    assert_eq!(
        fixture.writer.paths(),
        vec![
            "reports/MyFolder.reportFolder-meta.xml",
            "reports/MyFolder/Sub.reportFolder-meta.xml",
            "reports/MyFolder/Sub/MyReport.report",
        ]
    );
}

#[test]
fn folder_descriptor_names_the_folder() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new();

    let work = fixture.run(
        &git,
        RunConfig::new("from", "to"),
        &[ChangeRecord::added("reports/MyFolder.reportFolder-meta.xml")],
    );

    assert_eq!(work.to_add, manifest(&[("Report", "MyFolder")]));
}

#[test]
fn folder_type_copies_files_sharing_the_element_name() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "email/Templates.emailFolder-meta.xml", "<EmailFolder/>")
        .with_file("to", "email/Templates/welcome.email", "Hello")
        .with_file("to", "email/Templates/welcome.email-meta.xml", "<EmailTemplate/>")
        .with_file("to", "email/Templates/welcomeBack.email", "Hello again");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::modified("email/Templates/welcome.email-meta.xml")],
    );

    assert_eq!(work.to_add, manifest(&[("EmailTemplate", "Templates/welcome")]));
    assert_eq!(
        fixture.writer.paths(),
        vec![
            "email/Templates.emailFolder-meta.xml",
            "email/Templates/welcome.email",
            "email/Templates/welcome.email-meta.xml",
        ]
    );
}

#[test]
fn folder_deletion_redeploys_when_element_survives() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "email/Templates/welcome.email-meta.xml", "<EmailTemplate/>");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::deleted("email/Templates/welcome.email")],
    );

    assert!(work.to_destroy.is_empty());
    assert_eq!(work.to_add, manifest(&[("EmailTemplate", "Templates/welcome")]));
}

#[test]
fn bundle_change_copies_the_whole_bundle() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "lwc/myComponent/myComponent.js", "export default class {}")
        .with_file("to", "lwc/myComponent/myComponent.html", "<template></template>")
        .with_file("to", "lwc/myComponent/myComponent.js-meta.xml", "<LightningComponentBundle/>")
        .with_file("to", "lwc/other/other.js", "export default class {}");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::modified("lwc/myComponent/myComponent.js")],
    );

    assert_eq!(
        work.to_add,
        manifest(&[("LightningComponentBundle", "myComponent")])
    );
    assert_eq!(
        fixture.writer.paths(),
        vec![
            "lwc/myComponent/myComponent.html",
            "lwc/myComponent/myComponent.js",
            "lwc/myComponent/myComponent.js-meta.xml",
        ]
    );
    assert_eq!(fixture.writer.write_count(), 3);
}

#[test]
fn bundle_deletion_self_heals_when_bundle_survives() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "lwc/myComponent/myComponent.js", "export default class {}");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::deleted("lwc/myComponent/myComponent.css")],
    );

    assert!(work.to_destroy.is_empty());
    assert_eq!(
        work.to_add,
        manifest(&[("LightningComponentBundle", "myComponent")])
    );
    assert_eq!(fixture.writer.paths(), vec!["lwc/myComponent/myComponent.js"]);
}

#[test]
fn bundle_deletion_is_destructive_when_bundle_is_gone() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file("to", "lwc/other/other.js", "export default class {}");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::deleted("lwc/gone/gone.js")],
    );

    assert!(work.to_add.is_empty());
    assert_eq!(
        work.to_destroy,
        manifest(&[("LightningComponentBundle", "gone")])
    );
}

#[test]
fn single_file_resource_copies_its_descriptor() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "staticresources/logo.png", "png")
        .with_file("to", "staticresources/logo.resource-meta.xml", "<StaticResource/>");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::added("staticresources/logo.png")],
    );

    assert_eq!(work.to_add, manifest(&[("StaticResource", "logo")]));
    assert_eq!(
        fixture.writer.paths(),
        vec![
            "staticresources/logo.png",
            "staticresources/logo.resource-meta.xml",
        ]
    );
}

#[test]
fn site_collection_copies_only_the_changed_site() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "digitalExperiences/site/mySite/sfdc_cms__view/home/content.json", "{}")
        .with_file("to", "digitalExperiences/site/mySite/sfdc_cms__view/home/_meta.json", "{}")
        .with_file("to", "digitalExperiences/site/otherSite/sfdc_cms__view/home/content.json", "{}");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::modified(
            "digitalExperiences/site/mySite/sfdc_cms__view/home/content.json",
        )],
    );

    assert_eq!(
        work.to_add,
        manifest(&[("DigitalExperienceBundle", "site/mySite")])
    );
    assert_eq!(
        fixture.writer.paths(),
        vec![
            "digitalExperiences/site/mySite/sfdc_cms__view/home/_meta.json",
            "digitalExperiences/site/mySite/sfdc_cms__view/home/content.json",
        ]
    );
}

#[test]
fn rename_equals_deletion_then_addition() {
    let git = MockGitProvider::new()
        .with_file("to", "classes/New.cls", "public class New {}")
        .with_file("to", "classes/New.cls-meta.xml", "<ApexClass/>");

    let renamed = Fixture::new();
    let work_renamed = renamed.run(
        &git,
        delta_config(),
        &[ChangeRecord::renamed("classes/Old.cls", "classes/New.cls")],
    );

    let split = Fixture::new();
    let work_split = split.run(
        &git,
        delta_config(),
        &[
            ChangeRecord::deleted("classes/Old.cls"),
            ChangeRecord::added("classes/New.cls"),
        ],
    );

    assert_eq!(work_renamed.to_add, work_split.to_add);
    assert_eq!(work_renamed.to_destroy, work_split.to_destroy);
    assert_eq!(renamed.writer.paths(), split.writer.paths());
    assert_eq!(work_renamed.to_destroy, manifest(&[("ApexClass", "Old")]));
}

#[test]
fn case_only_rename_of_a_flat_file_destroys_nothing() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "classes/Foo.cls", "public class Foo {}")
        .with_file("to", "classes/Foo.cls-meta.xml", "<ApexClass/>");

    let mut work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::renamed("classes/foo.cls", "classes/Foo.cls")],
    );
    work.reconcile();

    assert!(work.to_destroy.is_empty());
    assert_eq!(work.to_add, manifest(&[("ApexClass", "Foo")]));
}

#[test]
fn case_only_rename_in_a_folder_destroys_nothing() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "reports/Sales/MyReport.report", "<Report/>");

    let mut work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::renamed(
            "reports/Sales/myReport.report",
            "reports/Sales/MyReport.report",
        )],
    );
    work.reconcile();

    assert!(work.to_destroy.is_empty());
    assert_eq!(work.to_add, manifest(&[("Report", "Sales/MyReport")]));
}

#[test]
fn case_only_rename_of_a_bundle_destroys_nothing() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "lwc/MyComponent/MyComponent.js", "export default class {}");

    let mut work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::deleted("lwc/myComponent/myComponent.js")],
    );
    work.reconcile();

    assert!(work.to_add.is_empty());
    assert!(work.to_destroy.is_empty());
}

#[test]
fn second_addition_of_the_same_file_writes_nothing() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", "classes/Foo.cls", "public class Foo {}")
        .with_file("to", "classes/Foo.cls-meta.xml", "<ApexClass/>");
    let mut work = Work::new(delta_config());

    fixture.run_on(&mut work, &git, &[ChangeRecord::added("classes/Foo.cls")]);
    let writes = fixture.writer.write_count();
    fixture.run_on(&mut work, &git, &[ChangeRecord::added("classes/Foo.cls")]);

    assert_eq!(writes, 2);
    assert_eq!(fixture.writer.write_count(), writes);
}

const PERMISSION_SET_PATH: &str = "force-app/main/default/permissionsets/Sales.permissionset-meta.xml";

const PERMISSION_SET_FROM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PermissionSet xmlns="http://soap.sforce.com/2006/04/metadata">
    <fieldPermissions>
        <editable>false</editable>
        <field>Account.Name</field>
        <readable>true</readable>
    </fieldPermissions>
    <label>Sales</label>
    <objectPermissions>
        <allowEdit>false</allowEdit>
        <allowRead>true</allowRead>
        <object>Account</object>
    </objectPermissions>
    <objectPermissions>
        <allowEdit>false</allowEdit>
        <allowRead>true</allowRead>
        <object>Contact</object>
    </objectPermissions>
</PermissionSet>
"#;

const PERMISSION_SET_TO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PermissionSet xmlns="http://soap.sforce.com/2006/04/metadata">
    <fieldPermissions>
        <editable>false</editable>
        <field>Account.Name</field>
        <readable>true</readable>
    </fieldPermissions>
    <fieldPermissions>
        <editable>true</editable>
        <field>Account.Industry</field>
        <readable>true</readable>
    </fieldPermissions>
    <label>Sales</label>
    <objectPermissions>
        <allowEdit>true</allowEdit>
        <allowRead>true</allowRead>
        <object>Account</object>
    </objectPermissions>
</PermissionSet>
"#;

#[test]
fn container_registers_changed_sub_elements_and_writes_pruned_document() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("from", PERMISSION_SET_PATH, PERMISSION_SET_FROM)
        .with_file("to", PERMISSION_SET_PATH, PERMISSION_SET_TO);

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::modified(PERMISSION_SET_PATH)],
    );

    assert_eq!(
        work.to_add,
        manifest(&[
            ("PermissionSet", "Sales"),
            ("PermissionSetFieldPermission", "Sales.Account.Industry"),
            ("PermissionSetObjectPermission", "Sales.Account"),
        ])
    );
    assert_eq!(
        work.to_destroy,
        manifest(&[("PermissionSetObjectPermission", "Sales.Contact")])
    );

    let written = fixture
        .writer
        .content(PERMISSION_SET_PATH)
        .expect("pruned document is written");
    assert!(written.contains("<field>Account.Industry</field>"));
    assert!(!written.contains("<field>Account.Name</field>"));
    assert!(!written.contains("<object>Contact</object>"));
    assert!(written.contains("<label>Sales</label>"));
}

#[test]
fn deleted_children_only_container_destroys_its_entries() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file(
        "from",
        "labels/CustomLabels.labels-meta.xml",
        "<CustomLabels><labels><fullName>Greeting</fullName><value>Hi</value></labels></CustomLabels>",
    );

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::deleted("labels/CustomLabels.labels-meta.xml")],
    );

    assert!(work.to_add.is_empty());
    assert_eq!(work.to_destroy, manifest(&[("CustomLabel", "Greeting")]));
    assert_eq!(fixture.writer.write_count(), 0);
}

#[test]
fn deleted_container_is_destroyed_with_its_entries() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file(
        "from",
        "workflows/Account.workflow-meta.xml",
        "<Workflow><rules><fullName>Escalate</fullName><active>true</active></rules></Workflow>",
    );

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::deleted("workflows/Account.workflow-meta.xml")],
    );

    assert_eq!(
        work.to_destroy,
        manifest(&[("Workflow", "Account"), ("WorkflowRule", "Account.Escalate")])
    );
}

#[test]
fn malformed_container_is_reported_as_a_warning() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new()
        .with_file("to", PERMISSION_SET_PATH, "<PermissionSet><label>Sales</PermissionSet>");

    let work = fixture.run(
        &git,
        delta_config(),
        &[ChangeRecord::added(PERMISSION_SET_PATH)],
    );

    assert!(work.to_add.is_empty());
    assert_eq!(work.warnings().len(), 1);
    assert!(work.warnings()[0].contains(PERMISSION_SET_PATH));
}

#[test]
fn ignored_paths_are_skipped_entirely() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new().with_file("to", "classes/Foo.cls", "public class Foo {}");
    let ignore = IgnoreRules::new(&["classes/Foo.cls".to_string()], &[]).expect("valid globs");

    let work = fixture.run(
        &git,
        delta_config().with_ignore(ignore),
        &[ChangeRecord::added("classes/Foo.cls")],
    );

    assert!(work.to_add.is_empty());
    assert_eq!(fixture.writer.write_count(), 0);
}

#[test]
fn destructive_ignore_only_skips_deletions() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new();
    let ignore = IgnoreRules::new(&[], &["classes/**".to_string()]).expect("valid globs");

    let work = fixture.run(
        &git,
        RunConfig::new("from", "to").with_ignore(ignore),
        &[
            ChangeRecord::deleted("classes/Old.cls"),
            ChangeRecord::added("classes/Foo.cls"),
        ],
    );

    assert!(work.to_destroy.is_empty());
    assert_eq!(work.to_add, manifest(&[("ApexClass", "Foo")]));
}

#[test]
fn paths_outside_source_directories_are_skipped() {
    let fixture = Fixture::new();
    let git = MockGitProvider::new();

    let work = fixture.run(
        &git,
        RunConfig::new("from", "to").with_source(vec!["force-app".to_string()]),
        &[
            ChangeRecord::added("legacy/classes/Old.cls"),
            ChangeRecord::added("force-app/classes/Foo.cls"),
        ],
    );

    assert_eq!(work.to_add, manifest(&[("ApexClass", "Foo")]));
}
