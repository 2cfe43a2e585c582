use std::io::{Read, Write};

use subline::cli::{self, TemplateSource};
use subline::eval::{Evaluator, RenderState};
use subline::lex::tokenize;
use subline::parse::parse;

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("subline: {e}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    let template = match read_template(&args.source) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("subline: {e}");
            std::process::exit(1);
        }
    };

    let state = RenderState::from_env();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = render(&template, state, &mut out, args.debug) {
        // Flush whatever was written before the failure so the partial
        // prompt and the diagnostic appear in order.
        let _ = out.flush();
        eprintln!("subline: {e}");
        std::process::exit(1);
    }

    if let Err(e) = out.flush() {
        eprintln!("subline: {e}");
        std::process::exit(1);
    }
}

fn read_template(source: &TemplateSource) -> std::io::Result<String> {
    match source {
        TemplateSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        TemplateSource::Literal(template) => Ok(template.clone()),
        TemplateSource::File(path) => std::fs::read_to_string(path),
    }
}

fn render(
    template: &str,
    state: RenderState,
    out: &mut dyn Write,
    debug: bool,
) -> Result<(), subline::Error> {
    let tokens = tokenize(template)?;
    if debug {
        for token in &tokens {
            eprintln!("{token}");
        }
    }

    let ast = parse(tokens)?;
    if debug {
        for &id in &ast.statements {
            eprintln!("{}", ast.render(id));
        }
    }

    let mut evaluator = Evaluator::new(&ast, state, out);
    evaluator.run()?;
    evaluator.finish()
}
