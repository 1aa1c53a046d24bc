use std::process::ExitCode;

fn main() -> ExitCode {
    file_sort_lib::run()
}
