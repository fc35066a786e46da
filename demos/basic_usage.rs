use std::env;

use tasklink::resources::{Project, Section, Task};
use tasklink::{Api, Config, Query, Resource};

fn main() -> anyhow::Result<()> {
    // Get API key from environment variable
    let api_key =
        env::var("TASKLINK_API_KEY").expect("Please set TASKLINK_API_KEY environment variable");

    let mut config = Config::default();
    config.api.key = api_key;
    config.logging.enabled = true;
    tasklink::logger::init(&config.logging)?;

    let api = Api::new(config)?;

    // Example: List projects
    println!("Fetching projects...");
    let mut projects = Project::find(&api, Query::new())?;
    println!("Found {} projects", projects.len());

    let Some(project) = projects.first_mut() else {
        println!("No projects available, nothing else to do.");
        return Ok(());
    };
    println!("Using project: {}", project.name().unwrap_or("<unnamed>"));

    // Example: Create a task directly in that project
    println!("\nCreating a new task...");
    let mut task = Task::from_map(serde_json::Map::new());
    task.set("name", "Test task from Rust")?;
    project.add_task(&api, &mut task)?;
    println!("Created task: {}", task.name().unwrap_or("<unnamed>"));

    // Example: Edit and save; only the changed field is sent
    task.set("notes", "created by the tasklink basic_usage demo")?;
    task.save(&api)?;
    println!("Task updated");

    // Example: Group the project's tasks into sections
    println!("\nFetching sections...");
    let sections = Section::find(&api, Query::new())?;
    for section in &sections {
        println!(
            "{} ({} tasks)",
            section.name().unwrap_or("<unnamed>"),
            section.subtasks().len()
        );
    }

    Ok(())
}
