use crate::app::command_support::{load_catalog, parse_flag_pairs};
use crate::model::{filter_agents, format_run_at, AgentRole, Record};
use crate::shared::logging::now_secs;

fn find<'a, R: Record>(records: &'a [R], raw_id: &str) -> Result<&'a R, String> {
    records
        .iter()
        .find(|record| record.id().to_string() == raw_id)
        .ok_or_else(|| format!("unknown {} `{raw_id}`", R::KIND))
}

fn show_id(args: &[String], noun: &str) -> Result<String, String> {
    if args.len() != 2 {
        return Err(format!("usage: {noun}s show <{noun}_id>"));
    }
    Ok(args[1].clone())
}

pub fn cmd_agents(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: agents <list|show> ...".to_string());
    }
    let catalog = load_catalog()?;

    match args[0].as_str() {
        "list" => {
            let mut role = None;
            let mut search = "";
            for (flag, value) in parse_flag_pairs(&args[1..], &["--role", "--search"])? {
                match flag {
                    "--role" => role = Some(AgentRole::parse(value)?),
                    _ => search = value,
                }
            }
            Ok(filter_agents(&catalog.agents, search, role)
                .into_iter()
                .map(|agent| {
                    format!(
                        "{} {} role={} status={}",
                        agent.id,
                        agent.name,
                        agent.role,
                        agent.status.as_str()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "show" => {
            let id = show_id(args, "agent")?;
            let agent = find(catalog.agents.as_slice(), &id)?;
            let endpoints = catalog
                .endpoints_for_agent(&agent.id)
                .into_iter()
                .map(|endpoint| endpoint.id.to_string())
                .collect::<Vec<_>>();
            Ok(format!(
                "id={}\nname={}\nrole={}\nhost={}\nversion={}\nstatus={}\nendpoints={}",
                agent.id,
                agent.name,
                agent.role,
                agent.host,
                agent.version,
                agent.status.as_str(),
                endpoints.join(",")
            ))
        }
        other => Err(format!("unknown agents subcommand `{other}`")),
    }
}

pub fn cmd_endpoints(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: endpoints <list|show> ...".to_string());
    }
    let catalog = load_catalog()?;

    match args[0].as_str() {
        "list" => Ok(catalog
            .endpoints
            .iter()
            .map(|endpoint| format!("{} {}", endpoint.id, endpoint.label()))
            .collect::<Vec<_>>()
            .join("\n")),
        "show" => {
            let id = show_id(args, "endpoint")?;
            let endpoint = find(catalog.endpoints.as_slice(), &id)?;
            Ok(format!(
                "id={}\nname={}\ndatabase_type={}\nrole={}\nagent={}\nurl={}",
                endpoint.id,
                endpoint.name,
                endpoint.database_type.label(),
                endpoint.role.as_str(),
                endpoint.agent_id,
                endpoint.connection_url()
            ))
        }
        other => Err(format!("unknown endpoints subcommand `{other}`")),
    }
}

pub fn cmd_pipelines(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: pipelines <list|show> ...".to_string());
    }
    let catalog = load_catalog()?;

    match args[0].as_str() {
        "list" => Ok(catalog
            .pipelines
            .iter()
            .map(|pipeline| {
                format!(
                    "{} {} status={}",
                    pipeline.id,
                    pipeline.name,
                    pipeline.status.as_str()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        "show" => {
            let id = show_id(args, "pipeline")?;
            let pipeline = find(catalog.pipelines.as_slice(), &id)?;
            let stages = &pipeline.stages;
            Ok(format!(
                "id={}\nname={}\nsource={}@{}\ntarget={}@{}\nrelay={}\nextract={} batch={}\nsend=compression:{} encryption:{}\npost={} on_conflict={}\nstatus={}",
                pipeline.id,
                pipeline.name,
                pipeline.source.endpoint_id,
                pipeline.source.agent_id,
                pipeline.target.endpoint_id,
                pipeline.target.agent_id,
                pipeline
                    .relay_agent_id
                    .as_ref()
                    .map_or_else(|| "none".to_string(), ToString::to_string),
                stages.extract.mode.label(),
                stages.extract.batch_size,
                stages.send.compression,
                stages.send.encryption,
                stages.post.apply_mode.label(),
                stages.post.conflict_policy.label(),
                pipeline.status.as_str()
            ))
        }
        other => Err(format!("unknown pipelines subcommand `{other}`")),
    }
}

pub fn cmd_tasks(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: tasks <list|show> ...".to_string());
    }
    let catalog = load_catalog()?;

    match args[0].as_str() {
        "list" => Ok(catalog
            .tasks
            .iter()
            .map(|task| {
                format!(
                    "{} {} type={} status={}",
                    task.id,
                    task.name,
                    task.task_type,
                    task.status.as_str()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        "show" => {
            let id = show_id(args, "task")?;
            let task = find(catalog.tasks.as_slice(), &id)?;
            let next_run = match task.schedule.next_run_at(now_secs())? {
                Some(ts) => format_run_at(ts),
                None => "none".to_string(),
            };
            Ok(format!(
                "id={}\nname={}\ntype={}\nsource={}\nschedule={}\nstatus={}\nnext_run={}",
                task.id,
                task.name,
                task.task_type,
                task.source.describe(),
                task.schedule.describe(),
                task.status.as_str(),
                next_run
            ))
        }
        other => Err(format!("unknown tasks subcommand `{other}`")),
    }
}
