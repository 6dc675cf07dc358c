use std::io::Read;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use sqlscope::catalog::SchemaCatalog;
use sqlscope::config::ConfigStore;
use sqlscope::{MachineState, Transition, VisualizerSession};

/// Analyse a SQL query and walk its execution steps.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run the timed step animation after the report
    #[arg(long, default_value_t = false)]
    animate: bool,

    /// Multiplier applied to the saved step interval
    #[arg(long)]
    speed: Option<f64>,

    /// Canvas width used for the table layout, in pixels
    #[arg(long)]
    width: Option<f32>,

    /// Query text; read from stdin when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    sql: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let _ = env_logger::Builder::from_default_env()
        .filter_module("sqlscope", log::LevelFilter::Info)
        .is_test(false)
        .try_init();

    let cli = Cli::parse();
    let sql = if cli.sql.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        cli.sql.join(" ")
    };

    let mut prefs = ConfigStore::new().load();
    if let Some(width) = cli.width {
        prefs.canvas_width = width;
    }

    let mut session = VisualizerSession::new(&prefs);
    session.set_query(&sql);

    let catalog = SchemaCatalog::demo();
    let report = json!({
        "query": session.query(),
        "plan": session.plan(),
        "layout": session.layout(),
        "extent": session.layout().extent(&prefs.layout_dimensions()),
        "catalog": catalog.resolve(session.query()),
        "snapshot": session.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !cli.animate {
        return Ok(());
    }

    if let Some(multiplier) = cli.speed {
        session.change_speed(multiplier)?;
    }
    if session.start()? == Transition::NothingToAnimate {
        println!("{}", session.snapshot().status_text);
        return Ok(());
    }

    let mut last_shown: Option<(usize, MachineState)> = None;
    loop {
        let snapshot = session.snapshot();
        let key = (snapshot.step_index, snapshot.machine_state);
        if last_shown != Some(key) {
            let frame = json!({
                "label": snapshot.step.map(|step| step.label()),
                "snapshot": snapshot,
                "highlights": session.highlights(),
            });
            println!("{}", serde_json::to_string(&frame)?);
            last_shown = Some(key);
        }
        if snapshot.machine_state == MachineState::Completed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Ok(())
}
