use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use assert_cmd::Command;
use rstest::rstest;
use tempfile::TempDir;

const ROUTE_HEADER: &str = "Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT\n";

fn ipinfo_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ipinfo"));
    cmd.env("RUST_BACKTRACE", "0")
        .env("NO_COLOR", "1")
        .env_remove("IP_CONFIG")
        .env_remove("IP_LOG");
    cmd
}

/// Serves one canned HTTP response and returns the URL to reach it.
fn spawn_echo_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 2048];
        let _ = stream.read(&mut buf);
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });
    format!("http://{addr}/")
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture { dir: tempfile::tempdir().unwrap() }
    }

    fn route_table(&self, rows: &str) -> std::path::PathBuf {
        let path = self.dir.path().join("route");
        std::fs::write(&path, format!("{ROUTE_HEADER}{rows}")).unwrap();
        path
    }

    fn config(&self, route_table: Option<&Path>, echo_url: &str, timeout_ms: u64) -> std::path::PathBuf {
        let mut toml = String::new();
        if let Some(table) = route_table {
            toml.push_str(&format!("[gateway]\nroute_table = {:?}\n\n", table.to_str().unwrap()));
        }
        toml.push_str(&format!(
            "[external]\nurl = {echo_url:?}\ntimeout_ms = {timeout_ms}\nno_proxy = true\n"
        ));
        let path = self.dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();
        path
    }
}

#[test]
fn version_flag() {
    let output = ipinfo_cmd().arg("-v").assert().success();
    let stdout = std::str::from_utf8(&output.get_output().stdout).unwrap();
    assert_eq!(stdout.trim(), concat!("ipinfo ", env!("CARGO_PKG_VERSION")));
}

#[rstest]
#[case(&["-x"])]
#[case(&["--bogus"])]
#[case(&["extra-positional"])]
fn bad_arguments_fail_with_usage(#[case] args: &[&str]) {
    let output = ipinfo_cmd().args(args).assert().failure().code(2);
    let stderr = std::str::from_utf8(&output.get_output().stderr).unwrap();
    assert!(stderr.contains("Usage:"), "{stderr}");
}

#[test]
fn missing_config_file_is_fatal() {
    let output = ipinfo_cmd()
        .args(["-e", "-c", "/nonexistent/ipinfo.toml"])
        .assert()
        .failure();
    let stderr = std::str::from_utf8(&output.get_output().stderr).unwrap();
    assert!(stderr.contains("Failed to read config file"), "{stderr}");
}

#[test]
fn external_plain() {
    let fixture = Fixture::new();
    let url = spawn_echo_server("200 OK", "203.0.113.7\n");
    let config = fixture.config(None, &url, 2_000);

    ipinfo_cmd()
        .arg("-e")
        .arg("-c")
        .arg(&config)
        .assert()
        .success()
        .stdout("203.0.113.7\n")
        .stderr("");
}

#[test]
fn external_from_env_config() {
    let fixture = Fixture::new();
    let url = spawn_echo_server("200 OK", "198.51.100.20");
    let config = fixture.config(None, &url, 2_000);

    ipinfo_cmd()
        .arg("-e")
        .env("IP_CONFIG", &config)
        .assert()
        .success()
        .stdout("198.51.100.20\n");
}

#[test]
fn external_timeout_is_reported_not_fatal() {
    let fixture = Fixture::new();
    // Never accepted or answered; the connect lands in the backlog.
    let silent = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", silent.local_addr().unwrap());
    let config = fixture.config(None, &url, 300);

    let output = ipinfo_cmd().arg("-e").arg("-c").arg(&config).assert().success().stdout("");
    let stderr = std::str::from_utf8(&output.get_output().stderr).unwrap();
    assert!(stderr.contains("External IP:"), "{stderr}");
    assert!(stderr.contains("request failed"), "{stderr}");
    drop(silent);
}

#[test]
fn external_bad_status_in_json() {
    let fixture = Fixture::new();
    let url = spawn_echo_server("429 Too Many Requests", "slow down");
    let config = fixture.config(None, &url, 2_000);

    let output = ipinfo_cmd().args(["-e", "-j"]).arg("-c").arg(&config).assert().success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json, serde_json::json!({ "external_error": "unexpected status: 429" }));
}

#[cfg(all(target_os = "linux", target_endian = "little"))]
mod routing_table {
    use super::*;

    #[test]
    fn no_default_route_with_no_headers() {
        let fixture = Fixture::new();
        let table = fixture.route_table("eth0\t0001A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0\n");
        let config = fixture.config(Some(&table), "http://127.0.0.1:9/", 100);

        let output = ipinfo_cmd()
            .args(["-g", "-n"])
            .arg("-c")
            .arg(&config)
            .assert()
            .success()
            .stdout("");
        let stderr = std::str::from_utf8(&output.get_output().stderr).unwrap();
        assert!(stderr.contains("Gateway IP:"), "{stderr}");
        assert!(stderr.contains("no default gateway found"), "{stderr}");
    }

    #[test]
    fn gateway_plain() {
        let fixture = Fixture::new();
        let table = fixture.route_table("eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n");
        let config = fixture.config(Some(&table), "http://127.0.0.1:9/", 100);

        ipinfo_cmd()
            .arg("-g")
            .arg("-c")
            .arg(&config)
            .assert()
            .success()
            .stdout("192.168.1.1\n");
    }

    #[test]
    fn gateway_and_external_json() {
        let fixture = Fixture::new();
        let table = fixture.route_table("eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n");
        let url = spawn_echo_server("200 OK", "203.0.113.7\n");
        let config = fixture.config(Some(&table), &url, 2_000);

        let output = ipinfo_cmd().args(["-g", "-e", "-j"]).arg("-c").arg(&config).assert().success();
        let stdout = std::str::from_utf8(&output.get_output().stdout).unwrap();
        assert_eq!(stdout, "{\n  \"gateway\": \"192.168.1.1\",\n  \"external\": \"203.0.113.7\"\n}\n");
    }

    #[test]
    fn default_view_json_reports_all_sections() {
        let fixture = Fixture::new();
        let table = fixture.route_table("eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n");
        let url = spawn_echo_server("200 OK", "203.0.113.7\n");
        let config = fixture.config(Some(&table), &url, 2_000);

        let output = ipinfo_cmd().arg("-j").arg("-c").arg(&config).assert().success();
        let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();

        assert_eq!(json["gateway"], "192.168.1.1");
        assert_eq!(json["external"], "203.0.113.7");
        assert!(json.get("gateway_error").is_none(), "{json}");
        assert!(json.get("external_error").is_none(), "{json}");
        if let Some(local) = json.get("local") {
            for entry in local.as_array().unwrap() {
                assert!(entry["addr"].as_str().unwrap().parse::<std::net::Ipv4Addr>().is_ok(), "{entry}");
                assert!(entry["interface"].is_string(), "{entry}");
            }
        }
    }

    #[test]
    fn default_view_text_has_headers_and_spacing() {
        let fixture = Fixture::new();
        let table = fixture.route_table("eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n");
        let url = spawn_echo_server("200 OK", "203.0.113.7\n");
        let config = fixture.config(Some(&table), &url, 2_000);

        let output = ipinfo_cmd().arg("-c").arg(&config).assert().success();
        let stdout = std::str::from_utf8(&output.get_output().stdout).unwrap();

        assert!(!stdout.contains('\x1b'), "{stdout:?}");
        assert!(
            stdout.ends_with("Gateway IP:\n  192.168.1.1\n\nExternal IP:\n  203.0.113.7\n"),
            "{stdout:?}"
        );
        if stdout.starts_with("Local IPs:\n") {
            assert!(stdout.contains("\n\nGateway IP:\n"), "{stdout:?}");
            let local_block = stdout.split("\n\n").next().unwrap();
            for line in local_block.lines().skip(1) {
                let addr = line.trim_start().split(' ').next().unwrap();
                assert!(line.starts_with("  "), "{line:?}");
                assert!(addr.parse::<std::net::Ipv4Addr>().is_ok(), "{line:?}");
                assert!(line.ends_with(')'), "{line:?}");
            }
        } else {
            assert!(stdout.starts_with("Gateway IP:\n"), "{stdout:?}");
        }
    }

    #[test]
    fn corrupt_table_is_a_section_error() {
        let fixture = Fixture::new();
        let table = fixture.route_table("eth0\tnothex\n");
        let config = fixture.config(Some(&table), "http://127.0.0.1:9/", 100);

        let output = ipinfo_cmd().args(["-g", "-j"]).arg("-c").arg(&config).assert().success();
        let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
        let message = json["gateway_error"].as_str().unwrap();
        assert!(message.starts_with("parsing routing table"), "{message}");
    }
}

#[test]
fn local_listing_skips_loopback() {
    let output = ipinfo_cmd().args(["-l", "-a"]).assert().success();
    let stdout = std::str::from_utf8(&output.get_output().stdout).unwrap();
    for line in stdout.lines() {
        let ip: std::net::Ipv4Addr = line.parse().unwrap();
        assert!(!ip.is_loopback(), "{line}");
    }
}

#[test]
fn local_json_entries_carry_interface_names() {
    let output = ipinfo_cmd().args(["-l", "-j"]).assert().success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    if let Some(entries) = json.get("local").and_then(|v| v.as_array()) {
        for entry in entries {
            assert!(entry["addr"].as_str().unwrap().parse::<std::net::Ipv4Addr>().is_ok());
            let iface = entry["interface"].as_str().unwrap();
            assert!(!iface.starts_with("bridge"), "{iface}");
        }
    }
    assert!(json.get("gateway").is_none());
    assert!(json.get("external").is_none());
}
