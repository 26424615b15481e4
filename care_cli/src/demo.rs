//! Interactive demo against a running gateway.

use anyhow::Context;
use serde_json::Value as JsonValue;

const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[94m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

fn header(text: &str) {
    let bar = "=".repeat(60);
    println!("\n{BOLD}{bar}{RESET}");
    println!("{BOLD}{text:^60}{RESET}");
    println!("{BOLD}{bar}{RESET}\n");
}

fn section(text: &str) {
    println!("\n{CYAN}{BOLD}> {text}{RESET}");
    println!("{CYAN}{}{RESET}", "-".repeat(50));
}

fn success(text: &str) {
    println!("{GREEN}+ {text}{RESET}");
}

fn info(text: &str) {
    println!("{BLUE}* {text}{RESET}");
}

fn warn(text: &str) {
    println!("{YELLOW}! {text}{RESET}");
}

async fn fetch(client: &reqwest::Client, url: &str) -> anyhow::Result<JsonValue> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?;
    response
        .error_for_status()
        .with_context(|| format!("gateway rejected {url}"))?
        .json::<JsonValue>()
        .await
        .with_context(|| format!("decoding {url}"))
}

async fn platform_info(client: &reqwest::Client, base: &str) -> anyhow::Result<()> {
    section("Platform Information");
    let data = fetch(client, &format!("{base}/")).await?;

    info(&format!("Name: {}", data["name"].as_str().unwrap_or("?")));
    info(&format!("Version: {}", data["version"].as_str().unwrap_or("?")));
    println!();
    info("Clinical Use Cases:");
    for use_case in data["clinical_use_cases"].as_array().into_iter().flatten() {
        println!(
            "  - {}: {}",
            use_case["name"].as_str().unwrap_or("?"),
            use_case["endpoint"].as_str().unwrap_or("?")
        );
    }
    Ok(())
}

async fn care_gaps(client: &reqwest::Client, base: &str, patient: &str) -> anyhow::Result<()> {
    section(&format!("Care Gap Detection for Patient {patient}"));
    let data = fetch(client, &format!("{base}/api/v1/care-gaps/patient/{patient}")).await?;

    success(&format!(
        "Analysis completed at {}",
        data["analysis_timestamp"].as_str().unwrap_or("?")
    ));
    info(&format!("Total gaps identified: {}", data["total_gaps"]));
    info(&format!(
        "Risk score: {:.2}",
        data["risk_score"].as_f64().unwrap_or(0.0)
    ));
    println!();

    if let Some(gaps) = data["care_gaps"].as_array() {
        info("Care Gaps Found:");
        for gap in gaps.iter().take(5) {
            let priority = gap["priority"].as_str().unwrap_or("?");
            let color = if priority == "critical" || priority == "high" {
                RED
            } else {
                YELLOW
            };
            println!(
                "  {color}[{}]{RESET} {}",
                priority.to_uppercase(),
                gap["name"].as_str().unwrap_or("?")
            );
            println!(
                "    Due: {} | Source: {}",
                gap["due_date"].as_str().unwrap_or("?"),
                gap["guideline_source"].as_str().unwrap_or("?")
            );
        }
    }

    if let Some(recommendations) = data["recommendations"].as_array() {
        println!();
        info("Recommendations:");
        for rec in recommendations {
            println!("  -> {}", rec.as_str().unwrap_or("?"));
        }
    }
    Ok(())
}

async fn readmission(client: &reqwest::Client, base: &str, patient: &str) -> anyhow::Result<()> {
    section(&format!("Readmission Risk Prediction for Patient {patient}"));
    let data = fetch(
        client,
        &format!("{base}/api/v1/readmission/predict/{patient}"),
    )
    .await?;

    let score = data["risk_score"].as_f64().unwrap_or(0.0);
    let tier = data["risk_tier"].as_str().unwrap_or("?");
    let tier_color = match tier {
        "low" => GREEN,
        "medium" => YELLOW,
        _ => RED,
    };

    success("Prediction completed");
    info(&format!("Risk Score: {:.1}%", score * 100.0));
    println!("  Risk Tier: {tier_color}{}{RESET}", tier.to_uppercase());
    if let Some(ci) = data["confidence_interval"].as_array() {
        println!(
            "  Confidence Interval: [{:.1}%, {:.1}%]",
            ci[0].as_f64().unwrap_or(0.0) * 100.0,
            ci[1].as_f64().unwrap_or(0.0) * 100.0
        );
    }

    if let Some(factors) = data["contributing_factors"].as_array() {
        println!();
        info("Top Contributing Factors:");
        for factor in factors.iter().take(5) {
            println!(
                "  - {}: {} (weight: {:.2})",
                factor["factor_name"].as_str().unwrap_or("?"),
                factor["value"].as_str().unwrap_or("?"),
                factor["weight"].as_f64().unwrap_or(0.0)
            );
        }
    }

    if let Some(interventions) = data["recommended_interventions"].as_array() {
        println!();
        info("Recommended Interventions:");
        for intervention in interventions.iter().take(3) {
            println!(
                "  [{}] {} (risk reduction: {:.0}%)",
                intervention["evidence_level"].as_str().unwrap_or("?"),
                intervention["name"].as_str().unwrap_or("?"),
                intervention["estimated_risk_reduction"].as_f64().unwrap_or(0.0) * 100.0
            );
        }
    }

    let governance = &data["model_governance"];
    println!();
    info("Model Governance:");
    println!(
        "  Model: {} v{}",
        governance["model_id"].as_str().unwrap_or("?"),
        governance["model_version"].as_str().unwrap_or("?")
    );
    println!("  Validation AUC: {}", governance["validation_auc"]);
    println!(
        "  Drift Status: {}",
        governance["drift_status"].as_str().unwrap_or("?")
    );
    Ok(())
}

async fn clinical_summary(client: &reqwest::Client, base: &str, patient: &str) -> anyhow::Result<()> {
    section(&format!("Clinical Summary for Patient {patient}"));
    let data = fetch(
        client,
        &format!("{base}/api/v1/summarize/patient/{patient}?summary_type=comprehensive"),
    )
    .await?;

    success(&format!(
        "Summary generated at {}",
        data["generated_at"].as_str().unwrap_or("?")
    ));
    println!();

    if data["phi_audit"]["phi_detected"].as_bool().unwrap_or(false) {
        warn(&format!(
            "PHI detected and redacted: {}",
            data["phi_audit"]["phi_types_found"]
        ));
    } else {
        success("PHI scan: No PHI detected in output");
    }
    println!();

    info("Clinical Summary:");
    let divider = "-".repeat(50);
    println!("{CYAN}{divider}{RESET}");
    let summary = data["summary"].as_str().unwrap_or("");
    if summary.len() > 800 {
        let mut cut = 800;
        while !summary.is_char_boundary(cut) {
            cut -= 1;
        }
        println!("{}...", &summary[..cut]);
    } else {
        println!("{summary}");
    }
    println!("{CYAN}{divider}{RESET}");

    if let Some(findings) = data["key_findings"].as_array() {
        println!();
        info("Key Findings:");
        for finding in findings.iter().take(4) {
            println!("  - {}", finding["finding"].as_str().unwrap_or("?"));
        }
    }

    if let Some(citations) = data["citations"].as_array() {
        println!();
        info(&format!("Citations ({} sources):", citations.len()));
        for citation in citations.iter().take(3) {
            println!(
                "  [{}] relevance {:.0}%",
                citation["source_type"].as_str().unwrap_or("?"),
                citation["relevance_score"].as_f64().unwrap_or(0.0) * 100.0
            );
        }
    }
    Ok(())
}

async fn governance(client: &reqwest::Client, base: &str) -> anyhow::Result<()> {
    section("Governance & Phase Status");
    let data = fetch(client, &format!("{base}/governance/phase-status")).await?;

    info(&format!(
        "Current Phase: {}",
        data["current_phase"].as_str().unwrap_or("?")
    ));
    println!();
    info("Phase Gate Status:");
    for gate in data["phase_gates"].as_array().into_iter().flatten().take(6) {
        let status = gate["status"].as_str().unwrap_or("?");
        let mark = match status {
            "approved" => "+",
            "in_progress" => "~",
            _ => "o",
        };
        println!(
            "  {mark} Phase {}: {} ({status})",
            gate["phase_number"],
            gate["phase_name"].as_str().unwrap_or("?")
        );
    }
    println!("  ...");

    let cost = fetch(client, &format!("{base}/governance/cost-telemetry")).await?;
    println!();
    info("Cost Telemetry (CT-1 Contract):");
    let metrics = &cost["metrics"];
    println!(
        "  Cost per inference: ${:.4}",
        metrics["cost_per_inference_usd"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  Value per inference: ${:.2}",
        metrics["value_per_inference_usd"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  ROI Ratio: {:.1}x",
        metrics["roi_ratio"].as_f64().unwrap_or(0.0)
    );
    Ok(())
}

pub async fn run(base_url: &str) -> anyhow::Result<()> {
    let base = base_url.trim_end_matches('/');
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    header("CareBridge Clinical AI Gateway");
    info("End-to-end healthcare AI platform demo");
    println!();

    info("Checking platform health...");
    let health = fetch(&client, &format!("{base}/health")).await;
    if health.is_err() {
        println!("{RED}x CareBridge gateway is not reachable at {base}{RESET}");
        info("Start it with: cargo run -p care_api");
        return Ok(());
    }
    success("Platform is healthy!");

    let patient = "P001";
    platform_info(&client, base).await?;
    care_gaps(&client, base, patient).await?;
    readmission(&client, base, patient).await?;
    clinical_summary(&client, base, patient).await?;
    governance(&client, base).await?;

    header("Demo Complete");
    success("All three clinical use cases demonstrated successfully!");
    Ok(())
}
