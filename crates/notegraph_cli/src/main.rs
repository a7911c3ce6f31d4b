//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notegraph_core` linkage and the configured database.
//! - With a user id argument, print that user's projects and their chapters
//!   in number order.

use log::{error, info};
use notegraph_core::{
    open_db, ChapterService, CoreConfig, ProjectService, SqliteDocumentStore,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notegraph_core ping={}", notegraph_core::ping());
    println!("notegraph_core version={}", notegraph_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(user_id: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        notegraph_core::init_logging(config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    println!("notegraph_core db={}", config.db_path.display());

    let Some(user_id) = user_id else {
        return Ok(());
    };

    let projects = ProjectService::new(store).list_projects(&user_id)?;
    let chapters = ChapterService::new(store);
    for project in &projects {
        println!("{} {}", project.id, project.name.as_str());
        for chapter in chapters.list_chapters(project.id.as_str(), &user_id)? {
            println!(
                "  {:>3}. {} ({} sections)",
                chapter.number.get(),
                chapter.name.as_str(),
                chapter.sections.len()
            );
        }
    }
    info!(
        "event=cli_list module=cli status=ok projects={}",
        projects.len()
    );
    Ok(())
}
