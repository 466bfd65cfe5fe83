use anyhow::Result;

use crate::CliTest;

#[test]
fn init_creates_config_file() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert!(output.status.success());
    assert!(test.exists(".sicklerc.json"));

    let config = test.read_json(".sicklerc.json")?;
    assert_eq!(config["nativeLang"], "zh");
    assert_eq!(config["transComponent"], "Trans");

    Ok(())
}

#[test]
fn init_refuses_to_overwrite() -> Result<()> {
    let test = CliTest::with_file(".sicklerc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(2));

    Ok(())
}

#[test]
fn no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scan"));

    Ok(())
}
