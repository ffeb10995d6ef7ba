use color_eyre::Result;

/// Run the interpreter.
fn main() -> Result<()> {
    slox_lib::run_interpreter::<slox_tw::TwInterpreter>()
}
