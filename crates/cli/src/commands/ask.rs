//! `vahed ask`: run one advisor request and print the JSON result.

use std::io::Read;
use std::path::Path;
use vahed_advisor::{Plan, PlanStatus};
use vahed_config::AppConfig;
use vahed_core::CourseSelectionRequest;

pub async fn run(
    config_path: &Path,
    request_path: &Path,
    show_candidates: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        AppConfig::load_with_env(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let request = read_request(request_path)?;

    let planner = vahed_gateway::bootstrap(&config).await?;
    let plan = planner.plan(&request).await?;

    print!("{}", render(&plan, show_candidates)?);
    Ok(())
}

/// Read a request from a file, or from stdin when the path is `-`.
fn read_request(path: &Path) -> Result<CourseSelectionRequest, Box<dyn std::error::Error>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?
    };
    parse_request(&content)
}

fn parse_request(content: &str) -> Result<CourseSelectionRequest, Box<dyn std::error::Error>> {
    serde_json::from_str(content).map_err(|e| format!("Invalid request JSON: {e}").into())
}

fn render(plan: &Plan, show_candidates: bool) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    if show_candidates {
        if let Some(candidates) = &plan.candidates {
            out.push_str("# Candidates\n");
            out.push_str(candidates.as_str());
            out.push_str("\n\n");
        }
        if let PlanStatus::Degraded(reason) = &plan.status {
            out.push_str(&format!("# Answer was not usable: {reason:?}\n\n"));
        }
    }
    out.push_str(&serde_json::to_string_pretty(&plan.courses)?);
    out.push('\n');
    Ok(out)
}
