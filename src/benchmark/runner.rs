//! Benchmark process runner
//!
//! Spawns the external workload generator with stdout and stderr bound to one
//! pipe, so the log holds a single ordered stream. Every line is written to the
//! attempt log and mirrored to the console as it arrives. A run blocks until
//! the pipe is drained and the child exits; there is no timeout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, PipeReader, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::params::{BenchmarkCommand, BenchmarkParams};
use crate::utils::{Result, TunerError};

/// Summary of one benchmark run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Lines captured from stdout and stderr combined
    pub lines: u64,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

/// Something that can execute one benchmark run into a log file
pub trait BenchmarkBackend {
    /// Run with `params`, creating or overwriting `log_path`.
    ///
    /// Only failures that make further rounds pointless (the benchmark cannot
    /// be started, the log cannot be written) are returned as errors.
    fn run(&mut self, params: &BenchmarkParams, log_path: &Path) -> Result<RunReport>;
}

/// Runs the benchmark as a child process
pub struct ProcessRunner {
    command: BenchmarkCommand,
    mirror: bool,
}

/// Outcome of draining the child's output pipe
struct Drained {
    lines: u64,
    read_error: Option<io::Error>,
    write_error: Option<io::Error>,
}

impl ProcessRunner {
    pub fn new(command: BenchmarkCommand) -> Self {
        Self {
            command,
            mirror: true,
        }
    }

    /// Enable or disable echoing benchmark output to stdout
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Start the child with stdout and stderr sharing one pipe
    fn spawn(&self, params: &BenchmarkParams) -> Result<(Child, PipeReader)> {
        let (reader, writer) = io::pipe()?;
        let stderr_writer = writer.try_clone()?;

        let mut command = Command::new(&self.command.program);
        command
            .args(self.command.to_args(params))
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer);

        let child = command.spawn().map_err(|source| TunerError::Launch {
            program: self.command.program.display().to_string(),
            source,
        })?;
        // `command` owns the parent's write ends; it must be gone before reading
        // or the pipe never reaches EOF.
        drop(command);
        Ok((child, reader))
    }

    /// Copy raw lines (newline included) into the log and the console until EOF
    fn drain(&self, source: PipeReader, sink: &mut BufWriter<File>) -> Drained {
        let mut reader = BufReader::new(source);
        let mut drained = Drained {
            lines: 0,
            read_error: None,
            write_error: None,
        };
        let console = io::stdout();
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    drained.read_error = Some(e);
                    break;
                }
            }
            drained.lines += 1;
            if drained.write_error.is_none() {
                if let Err(e) = sink.write_all(&line) {
                    drained.write_error = Some(e);
                }
            }
            if self.mirror {
                let mut out = console.lock();
                // Console is best effort; the log is authoritative
                let _ = out.write_all(&line).and_then(|_| out.flush());
            }
        }
        drained
    }
}

impl BenchmarkBackend for ProcessRunner {
    fn run(&mut self, params: &BenchmarkParams, log_path: &Path) -> Result<RunReport> {
        info!(
            "Running benchmark with concurrency = {}",
            params.concurrency
        );
        info!("Command: {}", self.command.render(params));

        let file = File::create(log_path).map_err(|source| TunerError::LogSink {
            path: log_path.to_path_buf(),
            source,
        })?;
        let mut sink = BufWriter::new(file);

        let start = Instant::now();
        let (mut child, output) = self.spawn(params)?;
        let mut drained = self.drain(output, &mut sink);

        if let Some(e) = drained.read_error.take() {
            warn!("Benchmark output stream error: {}", e);
            if let Err(kill_err) = child.kill() {
                debug!("Failed to kill benchmark: {}", kill_err);
            }
            child.wait()?;
            return Err(TunerError::Io(e));
        }

        let status = child.wait()?;
        let elapsed = start.elapsed();
        if drained.write_error.is_none() {
            if let Err(e) = sink.flush() {
                drained.write_error = Some(e);
            }
        }
        if let Some(source) = drained.write_error {
            return Err(TunerError::LogSink {
                path: log_path.to_path_buf(),
                source,
            });
        }

        report_status(&status);
        debug!(
            "Benchmark finished in {:.1}s, {} lines -> {}",
            elapsed.as_secs_f64(),
            drained.lines,
            log_path.display()
        );

        Ok(RunReport {
            lines: drained.lines,
            exit_code: status.code(),
            elapsed,
        })
    }
}

fn report_status(status: &ExitStatus) {
    if !status.success() {
        match status.code() {
            Some(code) => warn!("Benchmark exited with status {}", code),
            None => warn!("Benchmark terminated by signal"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::benchmark::WorkloadShape;
    use crate::metrics::read_decode_time;
    use std::fs;
    use std::path::PathBuf;

    fn shell(script: &str) -> ProcessRunner {
        let command = BenchmarkCommand {
            program: PathBuf::from("sh"),
            subcommand: vec!["-c".to_string(), script.to_string(), "bench".to_string()],
            ..BenchmarkCommand::default()
        };
        ProcessRunner::new(command).with_mirror(false)
    }

    fn params(concurrency: u32) -> BenchmarkParams {
        BenchmarkParams::new(
            PathBuf::from("/models/m"),
            concurrency,
            10,
            WorkloadShape {
                max_input_len: 100,
                min_input_len: 50,
                max_output_len: 200,
                min_output_len: 100,
            },
        )
    }

    #[test]
    fn test_captures_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.log");
        let mut runner = shell(
            "echo starting; echo 'oops' 1>&2; echo 'Average Decode Time (TPOT) | 12.5 ms'",
        );

        let report = runner.run(&params(4), &log).expect("run");
        assert_eq!(report.lines, 3);
        assert_eq!(report.exit_code, Some(0));

        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains("starting\n"));
        assert!(content.contains("oops\n"));
        assert_eq!(read_decode_time(&log), Some(12.5));
    }

    #[test]
    fn test_interleaved_streams_keep_write_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("order.log");
        let mut runner = shell(
            "for i in 1 2 3 4 5; do echo out-$i; echo err-$i 1>&2; done",
        );

        let report = runner.run(&params(3), &log).expect("run");
        assert_eq!(report.lines, 10);
        let expected: String = (1..=5)
            .map(|i| format!("out-{}\nerr-{}\n", i, i))
            .collect();
        assert_eq!(fs::read_to_string(&log).unwrap(), expected);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_log_write_failure_after_spawn_reaps_child() {
        // Writes to /dev/full fail with ENOSPC once the buffer spills; the run
        // must keep draining so the child can finish, then report the sink.
        let mut runner = shell("seq 1 50000; echo done 1>&2");

        let err = runner
            .run(&params(2), Path::new("/dev/full"))
            .unwrap_err();
        assert!(matches!(err, TunerError::LogSink { .. }));
    }

    #[test]
    fn test_passes_variable_flags() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("args.log");
        let mut runner = shell("echo \"$@\"");

        runner.run(&params(6), &log).expect("run");
        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains("--query_num 60 --concurrency 6"));
        assert!(content.contains("--model_path /models/m"));
    }

    #[test]
    fn test_nonzero_exit_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("fail.log");
        let mut runner = shell("echo partial; exit 3");

        let report = runner.run(&params(1), &log).expect("run");
        assert_eq!(report.exit_code, Some(3));
        assert_eq!(read_decode_time(&log), None);
    }

    #[test]
    fn test_overwrites_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("again.log");
        fs::write(&log, "Average Decode Time (TPOT) | 99.0 ms\n").unwrap();
        let mut runner = shell("echo fresh");

        runner.run(&params(2), &log).expect("run");
        assert_eq!(fs::read_to_string(&log).unwrap(), "fresh\n");
    }

    #[test]
    fn test_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let command = BenchmarkCommand {
            program: dir.path().join("missing-benchmark"),
            ..BenchmarkCommand::default()
        };
        let mut runner = ProcessRunner::new(command).with_mirror(false);

        let err = runner
            .run(&params(2), &dir.path().join("x.log"))
            .unwrap_err();
        assert!(matches!(err, TunerError::Launch { .. }));
    }
}
