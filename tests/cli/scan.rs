use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const CONFIG: &str = r#"{
    "includes": ["src"],
    "langs": ["zh", "en"],
    "fallbackLangs": {}
}"#;

fn project_with_two_files() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file(".sicklerc.json", CONFIG)?;
    test.write_file(
        "src/a.tsx",
        r#"export const greeting = t("问候语", "你好");"#,
    )?;
    test.write_file(
        "src/b.tsx",
        r#"
export function Farewell() {
    return <Trans>再见{{ name: user.name }}</Trans>;
}
"#,
    )?;
    Ok(test)
}

#[test]
fn scan_reports_untranslated_entries_against_empty_project() -> Result<()> {
    let test = project_with_two_files()?;

    let output = test.scan_command().output()?;
    assert!(output.status.success(), "scan failed: {output:?}");

    let stats = test.read_json("i18n/stats.json")?;
    assert_eq!(stats["stats"]["marked"], 2);
    assert_eq!(stats["stats"]["enUntranslated"], 2);
    assert_eq!(stats["languages"]["en"]["untranslated"], 2);
    assert_eq!(stats["languages"]["en"]["translated"], 0);

    // Zero translations exist, so no resource file is emitted for "en".
    assert!(!test.exists("i18n/translation/en.json"));

    // The native project source holds both sentences.
    let native = test.read_json("i18n/source/zh.json")?;
    let rows = native.as_object().expect("object");
    assert_eq!(rows.len(), 2);
    let values: Vec<&str> = rows.values().filter_map(|v| v.as_str()).collect();
    assert!(values.contains(&"问候语"));
    assert!(values.contains(&"再见{{name}}"));

    Ok(())
}

#[test]
fn second_scan_is_stable() -> Result<()> {
    let test = project_with_two_files()?;

    assert!(test.scan_command().output()?.status.success());
    let first = test.read_json("i18n/stats.json")?;

    assert!(test.scan_command().output()?.status.success());
    let second = test.read_json("i18n/stats.json")?;

    assert_eq!(first["stats"]["enUntranslated"], second["stats"]["enUntranslated"]);
    assert_eq!(first["languages"]["en"], second["languages"]["en"]);

    Ok(())
}

#[test]
fn translated_rows_produce_resource_files() -> Result<()> {
    let test = project_with_two_files()?;

    // Seed a project where one sentence is already translated.
    test.write_file("i18n/source/zh.json", r#"{}"#)?;
    assert!(test.scan_command().output()?.status.success());

    let native = test.read_file("i18n/source/zh.json")?;
    let rows: serde_json::Value = serde_json::from_str(&native)?;
    let key = rows
        .as_object()
        .expect("object")
        .iter()
        .find(|(_, v)| v.as_str() == Some("问候语"))
        .map(|(k, _)| k.clone())
        .expect("greeting key");

    test.write_file(
        "i18n/source/en.json",
        &format!(r#"{{ "{key}": "greeting" }}"#),
    )?;

    let output = test.scan_command().output()?;
    assert!(output.status.success());

    let stats = test.read_json("i18n/stats.json")?;
    assert_eq!(stats["languages"]["en"]["translated"], 1);
    assert_eq!(stats["languages"]["en"]["untranslated"], 1);

    let resource = test.read_json("i18n/translation/en.json")?;
    assert_eq!(resource[&key], "greeting");

    Ok(())
}

#[test]
fn export_untranslated_writes_per_language_files() -> Result<()> {
    let test = project_with_two_files()?;

    let output = test
        .scan_command()
        .arg("--export-untranslated")
        .output()?;
    assert!(output.status.success());

    let untranslated = test.read_json("i18n/untranslated/en.untranslated.json")?;
    assert_eq!(untranslated.as_object().expect("object").len(), 2);

    Ok(())
}

#[test]
fn opted_out_files_are_not_scanned() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".sicklerc.json", CONFIG)?;
    test.write_file(
        "src/skipped.ts",
        "// @i18n-noscan\nconst x = t(\"你好\");",
    )?;

    let output = test.scan_command().output()?;
    assert!(output.status.success());

    let stats = test.read_json("i18n/stats.json")?;
    assert_eq!(stats["stats"]["marked"], 0);
    assert!(!test.exists("i18n/source/zh.json"));

    Ok(())
}

#[test]
fn native_script_in_script_free_resource_is_fatal() -> Result<()> {
    let test = project_with_two_files()?;
    test.write_file("i18n/source/zh.json", r#"{ "k_0000abc": "标题" }"#)?;
    test.write_file("i18n/source/en.json", r#"{ "k_0000abc": "标题没翻译" }"#)?;

    let output = test.scan_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("en.json"), "stderr was: {stderr}");

    Ok(())
}

#[test]
fn advisory_reports_cover_unmarked_text() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".sicklerc.json", CONFIG)?;
    test.write_file(
        "src/bare.tsx",
        r#"export const Page = () => <div>确认删除</div>;"#,
    )?;

    let output = test.scan_command().output()?;
    assert!(output.status.success());

    let stats = test.read_json("i18n/stats.json")?;
    assert_eq!(stats["stats"]["unmarked"], 1);

    let report = test.read_file("i18n/unmarked.md")?;
    assert!(report.contains("确认删除"));
    assert!(report.contains("bare.tsx"));

    Ok(())
}

#[test]
fn parse_failures_fail_the_run_but_still_extract() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".sicklerc.json", CONFIG)?;
    test.write_file("src/broken.ts", "const a = t(\"标题\"); function {{{")?;

    let output = test.scan_command().output()?;
    assert_eq!(output.status.code(), Some(1));

    // The raw-text pass still harvested the call.
    let native = test.read_json("i18n/source/zh.json")?;
    let values: Vec<&str> = native
        .as_object()
        .expect("object")
        .values()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(values, vec!["标题"]);

    Ok(())
}
