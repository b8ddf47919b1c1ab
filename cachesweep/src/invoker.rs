//! Simulator invocation

// Imports
use {
	crate::sweep::Configuration,
	std::{
		ffi::OsString,
		io::{self, Read},
		path::{Path, PathBuf},
		process::{Child, Command, ExitStatus, Stdio},
		sync::mpsc,
		thread,
		time::{Duration, Instant},
	},
};

/// Invoker
///
/// Runs the simulator once for a configuration and returns its output.
pub trait Invoker {
	/// Invokes the simulator with `config`
	fn invoke(&mut self, config: &Configuration) -> Result<String, RunError>;
}

impl<F: FnMut(&Configuration) -> Result<String, RunError>> Invoker for F {
	fn invoke(&mut self, config: &Configuration) -> Result<String, RunError> {
		self(config)
	}
}

/// Invoker that spawns the simulator as a child process.
///
/// Standard output and error share a single pipe, so the captured
/// text keeps their interleaving.
#[derive(Clone, Debug)]
pub struct ProcessInvoker {
	/// Program
	program: PathBuf,

	/// Arguments passed before the configuration's
	prefix_args: Vec<OsString>,

	/// Timeout
	///
	/// If `None`, waits for the simulator forever.
	timeout: Option<Duration>,
}

impl ProcessInvoker {
	/// Interval between checks of whether the simulator has exited
	const POLL_INTERVAL: Duration = Duration::from_millis(10);

	/// Creates a new invoker for `program`
	pub fn new(program: impl Into<PathBuf>) -> Self {
		Self {
			program:     program.into(),
			prefix_args: vec![],
			timeout:     None,
		}
	}

	/// Sets arguments to pass before the configuration's
	#[must_use]
	pub fn with_prefix_args(mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
		self.prefix_args = args.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the timeout
	#[must_use]
	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}

	/// Returns the program
	pub fn program(&self) -> &Path {
		&self.program
	}

	/// Waits for `child` to exit, killing it if it exceeds `deadline`
	fn wait(&self, child: &mut Child, deadline: Option<Instant>) -> Result<ExitStatus, RunError> {
		let Some(deadline) = deadline else {
			return child.wait().map_err(RunError::Wait);
		};

		loop {
			if let Some(status) = child.try_wait().map_err(RunError::Wait)? {
				return Ok(status);
			}

			let now = Instant::now();
			if now >= deadline {
				// Note: The child might have exited in the meantime, which is fine,
				//       we still report it as timed out.
				self::kill(child);
				child.wait().map_err(RunError::Wait)?;

				return Err(self.timed_out());
			}

			thread::sleep(Self::POLL_INTERVAL.min(deadline - now));
		}
	}

	/// Returns the error for a run that exceeded the timeout
	fn timed_out(&self) -> RunError {
		RunError::TimedOut {
			timeout: self.timeout.unwrap_or_default(),
		}
	}
}

impl Invoker for ProcessInvoker {
	fn invoke(&mut self, config: &Configuration) -> Result<String, RunError> {
		let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
		let (mut reader, writer) = io::pipe().map_err(RunError::Pipe)?;
		let writer_err = writer.try_clone().map_err(RunError::Pipe)?;

		let mut command = Command::new(&self.program);
		command
			.args(&self.prefix_args)
			.args(config.args())
			.stdin(Stdio::null())
			.stdout(writer)
			.stderr(writer_err);

		// Note: With a timeout, the simulator leads its own process group, so that
		//       anything it starts can be killed along with it.
		#[cfg(unix)]
		if deadline.is_some() {
			std::os::unix::process::CommandExt::process_group(&mut command, 0);
		}

		let mut child = command.spawn().map_err(|source| RunError::Spawn {
			program: self.program.clone(),
			source,
		})?;

		// Note: The command holds on to our copies of the write end, which must
		//       be closed for the reader to ever see the end of the output.
		drop(command);

		// Note: We read on another thread so the child never blocks on a full pipe
		//       while we're waiting on it. Processes started by the simulator may
		//       keep the pipe open after it exits, so the read is bounded by the
		//       same deadline.
		let (output_tx, output_rx) = mpsc::channel();
		thread::spawn(move || {
			let mut output = vec![];
			let res = reader.read_to_end(&mut output).map(|_| output);

			// Note: If we timed out, nobody is listening anymore, which is fine
			let _ = output_tx.send(res);
		});

		let status = self.wait(&mut child, deadline)?;
		let output = match deadline {
			Some(deadline) => match output_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
				Ok(res) => res,
				Err(mpsc::RecvTimeoutError::Timeout) => {
					self::kill(&mut child);
					return Err(self.timed_out());
				},
				Err(mpsc::RecvTimeoutError::Disconnected) => Err(io::Error::other("Output reader panicked")),
			},
			None => output_rx
				.recv()
				.unwrap_or_else(|_| Err(io::Error::other("Output reader panicked"))),
		};
		let output = output.map_err(RunError::Capture)?;
		let output = String::from_utf8_lossy(&output).into_owned();

		match status.success() {
			true => Ok(output),
			false => Err(RunError::ExitStatus { status, output }),
		}
	}
}

/// Kills `child`, along with its process group, if it leads one
fn kill(child: &mut Child) {
	#[cfg(unix)]
	{
		// SAFETY: `killpg` has no memory safety requirements.
		// Note: If `child` doesn't lead a process group, this fails with `ESRCH`
		//       and we fall back to killing just the child.
		let pgid = child.id() as libc::pid_t;
		if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
			return;
		}
	}

	if let Err(err) = child.kill() {
		tracing::debug!(?err, "Unable to kill simulator");
	}
}

/// Run error
#[derive(Debug, thiserror::Error)]
pub enum RunError {
	/// Unable to create the output pipe
	#[error("Unable to create output pipe")]
	Pipe(#[source] io::Error),

	/// Unable to spawn the simulator
	#[error("Unable to spawn {program:?}")]
	Spawn {
		program: PathBuf,
		#[source]
		source:  io::Error,
	},

	/// Unable to wait for the simulator
	#[error("Unable to wait for simulator")]
	Wait(#[source] io::Error),

	/// Unable to read the simulator's output
	#[error("Unable to read simulator output")]
	Capture(#[source] io::Error),

	/// Simulator exited unsuccessfully
	#[error("Simulator exited with {status}")]
	ExitStatus { status: ExitStatus, output: String },

	/// Simulator didn't exit in time
	#[error("Simulator timed out after {timeout:?}")]
	TimedOut { timeout: Duration },
}

impl RunError {
	/// Returns the output captured before the failure, if any
	pub fn output(&self) -> Option<&str> {
		match self {
			Self::ExitStatus { output, .. } => Some(output),
			_ => None,
		}
	}
}
