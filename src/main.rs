use codon_vm::config::Config;
use codon_vm::lexer::{tokenize, validate_frame, validate_structure, Severity, Token};
use codon_vm::render::RecordingRenderer;
use codon_vm::timeline::{save_timeline, TimelineExport};
use codon_vm::vm::VirtualMachine;
use std::fs;
use std::path::Path;
use std::process;

/// Reads and tokenizes the program file, logging any advisory diagnostics.
///
/// # Arguments
/// * `path` - Path to the program source.
///
/// # Returns
/// * `Ok((String, Vec<Token>))` - The source text and its tokens.
/// * `Err(String)` - Error message if the file cannot be read or tokenized.
fn load_program(path: &str) -> Result<(String, Vec<Token>), String> {
    log::info!("Loading program from '{}'...", path);
    let source =
        fs::read_to_string(path).map_err(|e| format!("Failed to read program: {}", e))?;

    let tokens = tokenize(&source).map_err(|e| format!("Failed to tokenize program: {}", e))?;
    log::info!("Tokenized {} codon(s).", tokens.len());

    let diagnostics = validate_frame(&source)
        .into_iter()
        .chain(validate_structure(&tokens));
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Info => log::info!("{}", diagnostic),
        }
    }

    Ok((source, tokens))
}

fn main() {
    env_logger::init();
    log::info!("Booting codon VM...");

    // 1. Load and Validate Configuration
    let config = match Config::load(Path::new("config.toml")) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        log::error!("{}", e);
        process::exit(1);
    }
    log::info!("Configuration loaded and validated.");

    // 2. Load Program
    let (source, tokens) = match load_program(&config.program_file) {
        Ok(p) => p,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    // 3. Run
    let renderer = RecordingRenderer::new(config.surface.width, config.surface.height);
    let mut vm = VirtualMachine::with_config(renderer, &config.vm);
    let outcome = vm.run(&tokens);
    let exit_code = match &outcome {
        Ok(snapshots) => {
            println!(
                "Halted after {} instruction(s), {} snapshot(s).",
                vm.state().instruction_count,
                snapshots.len()
            );
            0
        }
        Err(failure) => {
            println!("Faulted: {}", failure);
            1
        }
    };

    let calls = vm.renderer_mut().take_calls();
    println!("Render calls ({}):", calls.len());
    for call in &calls {
        println!("  {:?}", call);
    }

    // 4. Optional Timeline Export
    if let Some(output) = &config.timeline_output {
        let export = TimelineExport::new(source, config.vm, config.surface, outcome, calls);
        match save_timeline(&export, Path::new(output)) {
            Ok(()) => log::info!("Timeline written to '{}'.", output),
            Err(e) => {
                log::error!("Failed to write timeline: {}", e);
                process::exit(1);
            }
        }
    }

    process::exit(exit_code);
}
