//! End-to-end sweeps against a fake simulator

#![cfg(unix)]

// Imports
use {
	cachesweep::{Grid, ProcessInvoker, SkipCounts, Sweep},
	std::{fs, path::Path, process::Command, time::Duration},
};

/// Fake simulator.
///
/// Fails if the trace doesn't exist, and omits the evictions when `b` is 3.
const SIMULATOR: &str = r#"
while [ $# -gt 0 ]; do
	case "$1" in
		-s) s=$2 ;;
		-E) e=$2 ;;
		-b) b=$2 ;;
		-t) t=$2 ;;
	esac
	shift 2
done

if [ ! -f "$t" ]; then
	echo "Error: trace file not found."
	exit 1
fi

echo "Cache parameters:"
echo "  s_bits (s): $s"
echo
echo "Summary (for now):"
echo "Hits: $((s * e))"
echo "Misses: $b"
if [ "$b" != 3 ]; then
	echo "Evictions: $((e - 1))"
fi
"#;

fn invoker() -> ProcessInvoker {
	ProcessInvoker::new("sh")
		.with_prefix_args(["-c", SIMULATOR, "cache_simulator"])
		.with_timeout(Some(Duration::from_secs(60)))
}

fn expected_csv(trace: &Path) -> String {
	let trace = trace.display();
	[
		"trace,s,E,b,hits,misses,evictions,hit_rate,miss_rate".to_owned(),
		format!("{trace},1,1,2,1,2,0,0.3333333333333333,0.6666666666666666"),
		format!("{trace},1,2,2,2,2,1,0.5,0.5"),
		format!("{trace},2,1,2,2,2,0,0.5,0.5"),
		format!("{trace},2,2,2,4,2,1,0.6666666666666666,0.3333333333333333"),
	]
	.map(|line| line + "\n")
	.concat()
}

#[test]
fn sweep_to_csv() {
	let dir = tempfile::tempdir().expect("Unable to create temporary directory");
	let trace = dir.path().join("short.trace");
	fs::write(&trace, "L 10,1\n").expect("Unable to write trace");
	let missing_trace = dir.path().join("missing.trace");

	let grid = Grid::new(vec![trace.clone(), missing_trace], vec![1, 2], vec![1, 2], vec![2, 3])
		.expect("Unable to create grid");
	let sweep = Sweep::new(grid, Duration::from_secs(1));

	let run = || {
		let output = sweep.run(&mut invoker());
		let mut csv = vec![];
		output.table.write_csv(&mut csv).expect("Unable to write csv");
		(output.skipped, csv)
	};

	let (skipped, csv) = run();
	assert_eq!(skipped, SkipCounts {
		run_failed:   8,
		timed_out:    0,
		parse_failed: 4,
	});
	assert_eq!(String::from_utf8_lossy(&csv), expected_csv(&trace));

	// Running it again must produce the exact same output
	let (_, csv_again) = run();
	assert_eq!(csv, csv_again);
}

#[test]
fn binary_writes_results() {
	let dir = tempfile::tempdir().expect("Unable to create temporary directory");
	let trace = dir.path().join("short.trace");
	fs::write(&trace, "L 10,1\n").expect("Unable to write trace");
	let output_path = dir.path().join("results.csv");

	let config_path = dir.path().join("config.json");
	let config = serde_json::json!({
		"simulator": "sh",
		"simulator_args": ["-c", SIMULATOR, "cache_simulator"],
		"traces": [trace],
		"s_values": [1, 2],
		"E_values": [1, 2],
		"b_values": [2, 3],
		"output": output_path,
		"timeout_secs": 60.0,
	});
	fs::write(&config_path, config.to_string()).expect("Unable to write config");

	let status = Command::new(env!("CARGO_BIN_EXE_cachesweep"))
		.arg("--config")
		.arg(&config_path)
		.status()
		.expect("Unable to run binary");
	assert!(status.success());

	let csv = fs::read_to_string(&output_path).expect("Unable to read results");
	assert_eq!(csv, expected_csv(&trace));
}

#[test]
fn binary_keeps_previous_results_until_done() {
	let dir = tempfile::tempdir().expect("Unable to create temporary directory");
	let output_path = dir.path().join("results.csv");
	fs::write(&output_path, "previous results\n").expect("Unable to write previous results");

	// Note: The simulator only succeeds while the previous results are intact
	let simulator = format!(
		"grep -q 'previous results' '{}' || exit 1; echo 'Hits: 1'; echo 'Misses: 1'; echo 'Evictions: 0'",
		output_path.display()
	);
	let status = Command::new(env!("CARGO_BIN_EXE_cachesweep"))
		.arg("--simulator")
		.arg("sh")
		.arg("--simulator-arg=-c")
		.arg(format!("--simulator-arg={simulator}"))
		.arg("--simulator-arg=cache_simulator")
		.arg("--output")
		.arg(&output_path)
		.arg("short.trace")
		.status()
		.expect("Unable to run binary");
	assert!(status.success());

	let csv = fs::read_to_string(&output_path).expect("Unable to read results");
	let mut lines = csv.lines();
	assert_eq!(
		lines.next(),
		Some("trace,s,E,b,hits,misses,evictions,hit_rate,miss_rate")
	);
	assert_eq!(lines.count(), 8 * 8 * 5);

	// Only the results should be left in the directory
	let entries = fs::read_dir(dir.path()).expect("Unable to read directory").count();
	assert_eq!(entries, 1);
}

#[test]
fn binary_fails_before_sweeping_if_output_is_unwritable() {
	let dir = tempfile::tempdir().expect("Unable to create temporary directory");
	let marker = dir.path().join("invoked");

	let status = Command::new(env!("CARGO_BIN_EXE_cachesweep"))
		.arg("--simulator")
		.arg("sh")
		.arg("--simulator-arg=-c")
		.arg(format!("--simulator-arg=touch {}", marker.display()))
		.arg("--output")
		.arg(dir.path().join("missing").join("results.csv"))
		.arg(dir.path().join("short.trace"))
		.status()
		.expect("Unable to run binary");

	assert!(!status.success());
	assert!(!marker.exists());
}

#[test]
fn binary_rejects_zero_axis_values() {
	let dir = tempfile::tempdir().expect("Unable to create temporary directory");
	let config_path = dir.path().join("config.json");
	fs::write(&config_path, r#"{ "s_values": [0, 1] }"#).expect("Unable to write config");

	let status = Command::new(env!("CARGO_BIN_EXE_cachesweep"))
		.arg("--config")
		.arg(&config_path)
		.arg("--output")
		.arg(dir.path().join("results.csv"))
		.status()
		.expect("Unable to run binary");
	assert!(!status.success());
}
