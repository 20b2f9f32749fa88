mod cli;
mod run;
mod settings;

fn main() -> std::process::ExitCode {
    run::native_main()
}
