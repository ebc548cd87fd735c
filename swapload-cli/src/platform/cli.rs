//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和解析结果打印。

use swapload_api::{Observation, Resolved, StaleModule, Staleness, SwaploadError, WorkerReport};

/// One line of `resolve` output
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub module: String,
    pub origin: &'static str,
    pub loader: String,
    pub size: usize,
    pub digest: String,
}

impl ResolvedRow {
    pub fn new(resolved: &Resolved) -> Self {
        let handle = &resolved.handle;
        Self {
            module: handle.name().to_string(),
            origin: resolved.origin.as_str(),
            loader: handle.owner().to_string(),
            size: handle.bytes().len(),
            digest: format!("{:016x}", handle.digest()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "module": self.module,
            "origin": self.origin,
            "loader": self.loader,
            "size": self.size,
            "digest": self.digest,
        })
    }
}

/// 打印错误报告
pub fn print_error(e: &SwaploadError, json: bool) {
    let report = e.to_report();
    if json {
        eprintln!("{}", report.to_json());
    } else {
        eprintln!("❌ {}", report);
    }
}

/// Print resolution results as an aligned table or a JSON array
pub fn print_resolved(rows: &[ResolvedRow], json: bool) {
    if json {
        let values: Vec<_> = rows.iter().map(ResolvedRow::to_json).collect();
        println!("{}", serde_json::Value::Array(values));
        return;
    }

    let width = rows.iter().map(|r| r.module.len()).max().unwrap_or(0);
    for row in rows {
        println!(
            "{:<width$}  {:<6}  {:<10}  {:>8} B  {}",
            row.module,
            row.origin,
            row.loader,
            row.size,
            row.digest,
            width = width
        );
    }
}

pub fn print_observation(observation: &Observation) {
    match &observation.output {
        Ok(text) => println!(
            "[{} {}] {} #{}: {}",
            observation.worker, observation.loader, observation.module, observation.iteration, text
        ),
        Err(e) => println!(
            "[{} {}] {} #{}: error: {}",
            observation.worker, observation.loader, observation.module, observation.iteration, e
        ),
    }
}

pub fn print_stale(stale: &[StaleModule]) {
    for module in stale {
        let what = match module.staleness {
            Staleness::Changed { current_digest } => format!("changed (now {:016x})", current_digest),
            Staleness::Removed => "removed".to_string(),
        };
        println!(
            "~ {} loaded by {} is stale: {}",
            module.handle.name(),
            module.handle.owner(),
            what
        );
    }
}

pub fn print_reports(reports: &[WorkerReport]) {
    for report in reports {
        println!(
            "{}: {} from {}, {} invocations, {} failures",
            report.worker, report.module, report.loader, report.iterations, report.failures
        );
        if report.dropped > 0 {
            println!("  {} observations dropped", report.dropped);
        }
    }
}
