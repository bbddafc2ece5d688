use std::process::ExitCode;

fn main() -> ExitCode {
  liftlog_lib::run()
}
