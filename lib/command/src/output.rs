#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub pid: Option<u32>,
  pub code: Option<i32>,
  pub success: bool,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn from_output(
    pid: Option<u32>,
    output: std::process::Output,
  ) -> Self {
    CommandOutput {
      pid,
      code: output.status.code(),
      success: output.status.success(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
  }

  pub fn from_io_error(e: &std::io::Error) -> Self {
    CommandOutput {
      pid: None,
      code: None,
      success: false,
      stdout: String::new(),
      stderr: e.to_string(),
    }
  }
}
