use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

use glyphlint::{
    engine::{FreeTypeEngine, SkrifaEngine},
    Engine, Error, GlyphRange, LintOptions, LoadFlags, RenderMode, Session,
};

/// Simple font tester: prints a fingerprint of every glyph in a set of
/// font files.
#[derive(clap::Parser, Debug)]
#[command(name = "glyphlint")]
struct Args {
    /// Use hex number L as load flags (see FreeType's `FT_LOAD_XXX`)
    #[arg(short = 'f', value_name = "L", value_parser = LoadFlags::from_hex, default_value = "0")]
    load_flags: LoadFlags,
    /// Set render mode to N (0 normal, 1 light, 2 mono, 3 lcd, 4 lcd-v)
    #[arg(
        short = 'r',
        value_name = "N",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    render_mode: i32,
    /// Range of glyph indices to use (default: all)
    #[arg(short = 'i', value_name = "I-J")]
    range: Option<GlyphRange>,
    /// Quiet mode without the rendering analysis
    #[arg(short = 'q')]
    quiet: bool,
    /// The font engine to test
    #[arg(long, value_enum, default_value_t)]
    engine: EngineKind,
    /// Size in pixels per em
    ppem: u32,
    /// Paths to font files to check (may use glob syntax)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Specifies which font engine loads and renders glyphs.
#[derive(clap::ValueEnum, Copy, Clone, Default, Debug)]
enum EngineKind {
    /// FreeType.
    #[default]
    #[value(name = "freetype")]
    FreeType,
    /// Skrifa outlines rasterized with zeno.
    Skrifa,
}

fn main() {
    env_logger::init();
    use clap::Parser as _;
    let args = Args::parse_from(wild::args());

    let options = LintOptions {
        ppem: args.ppem,
        load_flags: args.load_flags,
        render_mode: RenderMode::from_index(args.render_mode),
        range: args.range.unwrap_or_default(),
        quiet: args.quiet,
    };
    log::debug!("{options:?}");

    let result = match args.engine {
        EngineKind::FreeType => match FreeTypeEngine::new() {
            Ok(engine) => lint(&engine, &options, &args.files),
            Err(error) => {
                log::error!("failed to initialize FreeType");
                println!("{error}");
                std::process::exit(1);
            }
        },
        EngineKind::Skrifa => lint(&SkrifaEngine, &options, &args.files),
    };
    if let Err(e) = result {
        let _ = writeln!(std::io::stderr(), "glyphlint: {e}");
        std::process::exit(1);
    }
}

fn lint<E: Engine>(engine: &E, options: &LintOptions, files: &[PathBuf]) -> Result<(), Error> {
    let out = BufWriter::new(std::io::stdout().lock());
    Session::new(engine, options, out).run(files)
}
