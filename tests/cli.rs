use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_level(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp level");
    tmp.write_all(xml.as_bytes()).expect("write level");
    tmp
}

fn game() -> Command {
    Command::cargo_bin("cat-vs-zombies").expect("binary exists")
}

#[test]
fn headless_builtin_level_prints_final_state() {
    game()
        .args(["--headless", "--frames", "60"])
        .assert()
        .success()
        .stdout(contains("Loaded level Whisker Woods"))
        .stdout(contains("Simulated 60 frame(s)"))
        .stdout(contains(" - phase: Playing"))
        .stdout(contains(" - health: 100/100"));
}

#[test]
fn custom_level_where_zombies_win() {
    let level = write_level(
        r#"<level name="Tiny Pen">
  <settings>
    <arena_size>6</arena_size>
    <zombie_spawn_interval>0.1</zombie_spawn_interval>
    <min_spawn_distance>0</min_spawn_distance>
    <zombie_speed>20</zombie_speed>
    <zombie_damage>100</zombie_damage>
  </settings>
  <spawn>0 0 0</spawn>
</level>
"#,
    );
    game()
        .arg("--level")
        .arg(level.path())
        .args(["--headless", "--frames", "300"])
        .assert()
        .success()
        .stdout(contains("Loaded level Tiny Pen with 0 props"))
        .stdout(contains(" - phase: GameOver"))
        .stdout(contains(" - health: 0/100"));
}

#[test]
fn same_seed_gives_same_run() {
    let run = || {
        game()
            .args(["--headless", "--frames", "400", "--seed", "42"])
            .output()
            .expect("run game")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn invalid_level_is_reported() {
    let level = write_level("<level><prop><kind>volcano</kind></prop></level>");
    game()
        .arg("--level")
        .arg(level.path())
        .arg("--headless")
        .assert()
        .failure()
        .stderr(contains("failed to parse level"));
}

#[test]
fn unknown_argument_is_rejected() {
    game()
        .arg("--fly")
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --fly"));
}
