//! Configuration tests.

use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;

const PAGE: &str = "<html><head><style amp-custom>a { color: red }</style></head></html>";

#[test]
fn default_config_file() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("ampsite.toml").write_str(
        r#"
            input_dir = "rendered"
            output_dir = "public"
            ignore_paths = ["rendered/drafts"]
        "#,
    )?;
    dir.child("rendered/index.html").write_str(PAGE)?;
    dir.child("rendered/drafts/wip.html").write_str(PAGE)?;

    Command::cargo_bin("ampsite")?
        .args(["build"])
        .current_dir(&dir)
        .assert()
        .success();

    dir.child("public/index.html")
        .assert(predicate::str::contains("<style amp-custom>a{color:red}</style>"));
    dir.child("public/drafts")
        .assert(predicate::path::exists().not());
    dir.child("_site").assert(predicate::path::exists().not());

    Ok(())
}

#[test]
fn config_max_css_bytes() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("site.toml").write_str("max_css_bytes = 4")?;
    dir.child("index.html").write_str(PAGE)?;

    Command::cargo_bin("ampsite")?
        .args(["build", "--config", "site.toml"])
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds"));

    // Command line options override the configuration file
    Command::cargo_bin("ampsite")?
        .args(["build", "--config", "site.toml", "--max-css-bytes", "1024"])
        .current_dir(&dir)
        .assert()
        .success();

    dir.child("_site/index.html").assert(predicate::path::is_file());
    dir.child("_site/site.toml")
        .assert(predicate::path::exists().not());

    Ok(())
}

#[test]
fn config_mode() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("ampsite.toml").write_str("mode = \"development\"")?;
    dir.child("index.html").write_str(PAGE)?;

    Command::cargo_bin("ampsite")?
        .args(["build"])
        .current_dir(&dir)
        .assert()
        .success();

    dir.child("_site/index.html").assert(PAGE);

    Ok(())
}

#[test]
fn fail_unknown_field() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("ampsite.toml").write_str("minify = false")?;

    Command::cargo_bin("ampsite")?
        .args(["build"])
        .current_dir(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("minify"));

    Ok(())
}
