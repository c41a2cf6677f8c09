//! Report saving tool
//!
//! The model passes loosely structured strings. Each one is parsed as JSON
//! when possible; anything else falls back to defaults, and every fallback
//! is logged and listed in the tool output.

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use chrono::Local;
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{Language, StockConfig};
use crate::error::Result;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ labels.lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ labels.title }}</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }
        .header { border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 30px; }
        .section { margin-bottom: 30px; }
        .section h2 { color: #2c3e50; border-left: 4px solid #3498db; padding-left: 10px; }
        .analysis { background: #f8f9fa; padding: 20px; border-radius: 5px; white-space: pre-wrap; }
        .recommendation { background: #e8f5e8; padding: 15px; border-radius: 5px; }
        .footer { margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; }
    </style>
</head>
<body>
    <div class="header">
        <h1>{{ labels.title }}</h1>
    </div>
    <div class="section">
        <h2>{{ labels.stock_info }}</h2>
        <p><strong>{{ labels.symbol }}:</strong> {{ stock.symbol }}</p>
        <p><strong>{{ labels.generated_at }}:</strong> {{ generated_at }}</p>
        <p><strong>{{ labels.period }}:</strong> {{ stock.period }}</p>
    </div>
    <div class="section">
        <h2>{{ labels.price_data }}</h2>
        <pre>{{ stock.data_summary }}</pre>
    </div>
    <div class="section">
        <h2>{{ labels.chart }}</h2>
        <p>{{ chart.description }}</p>
        <p><strong>{{ labels.chart_file }}:</strong> <code>{{ chart.path }}</code></p>
    </div>
    <div class="section">
        <h2>{{ labels.analysis }}</h2>
        <div class="analysis">{{ analysis.analysis }}</div>
        <div class="recommendation">
            <h3>{{ labels.recommendation }}</h3>
            <p>{{ analysis.recommendation }}</p>
        </div>
    </div>
    <div class="footer">
        <p>{{ labels.footer }}</p>
        <p>{{ labels.generated_at }}: {{ generated_at }}</p>
    </div>
</body>
</html>
"#;

const MARKDOWN_TEMPLATE: &str = r"# {{ labels.title }}

## {{ labels.stock_info }}
- **{{ labels.symbol }}**: {{ stock.symbol }}
- **{{ labels.generated_at }}**: {{ generated_at }}
- **{{ labels.period }}**: {{ stock.period }}

## {{ labels.price_data }}
{{ stock.data_summary }}

## {{ labels.chart }}
{{ chart.description }}

**{{ labels.chart_file }}**: `{{ chart.path }}`

## {{ labels.analysis }}
{{ analysis.analysis }}

### {{ labels.recommendation }}
{{ analysis.recommendation }}

---
*{{ labels.footer }} {{ generated_at }}*
";

/// Outcome of parsing one loosely typed input
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    /// The input was structured as expected
    Parsed(T),
    /// Defaults were used instead
    Fallback { value: T, reason: String },
}

impl<T> Extraction<T> {
    /// The extracted or default value
    pub fn value(&self) -> &T {
        match self {
            Extraction::Parsed(value) | Extraction::Fallback { value, .. } => value,
        }
    }

    /// Why defaults were used, if they were
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Extraction::Parsed(_) => None,
            Extraction::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Stock section of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockInfo {
    pub symbol: String,
    pub period: String,
    pub data_summary: String,
}

/// Chart section of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartInfo {
    pub path: String,
    pub description: String,
}

/// Analysis section of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisInfo {
    pub analysis: String,
    pub recommendation: String,
}

#[derive(Serialize)]
struct Labels {
    lang: &'static str,
    title: &'static str,
    stock_info: &'static str,
    symbol: &'static str,
    generated_at: &'static str,
    period: &'static str,
    price_data: &'static str,
    chart: &'static str,
    chart_file: &'static str,
    analysis: &'static str,
    recommendation: &'static str,
    footer: &'static str,
    unknown_symbol: &'static str,
    default_period: &'static str,
    default_summary: &'static str,
    custom_period: &'static str,
    default_chart_description: &'static str,
    default_analysis: &'static str,
    default_recommendation: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::English => Labels {
            lang: "en",
            title: "Stock Analysis Report",
            stock_info: "Stock Information",
            symbol: "Symbol",
            generated_at: "Generated at",
            period: "Data period",
            price_data: "Price Data",
            chart: "Chart",
            chart_file: "Chart file",
            analysis: "Analysis",
            recommendation: "Recommendation",
            footer: "Generated automatically by the multi-agent stock analysis team.",
            unknown_symbol: "unknown",
            default_period: "not specified",
            default_summary: "No price data was provided.",
            custom_period: "custom period",
            default_chart_description: "Stock price chart",
            default_analysis: "No analysis was provided.",
            default_recommendation: "Make investment decisions according to your own risk tolerance.",
        },
        Language::Chinese => Labels {
            lang: "zh-CN",
            title: "股票分析报告",
            stock_info: "股票信息",
            symbol: "股票代码",
            generated_at: "生成时间",
            period: "数据周期",
            price_data: "价格数据",
            chart: "图表信息",
            chart_file: "图表文件",
            analysis: "专业分析",
            recommendation: "投资建议",
            footer: "本报告由多智能体系统自动生成。",
            unknown_symbol: "未知",
            default_period: "未指定",
            default_summary: "未提供价格数据。",
            custom_period: "自定义周期",
            default_chart_description: "股票价格走势图",
            default_analysis: "未提供分析内容。",
            default_recommendation: "请根据个人风险承受能力做出投资决策。",
        },
    }
}

fn parse_object(raw: &str) -> std::result::Result<serde_json::Map<String, Value>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("input is empty".to_string());
    }
    if !trimmed.starts_with('{') {
        return Err("input is not a JSON object".to_string());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("input is not a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

fn text_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

fn extract_stock(raw: &str, labels: &Labels) -> Extraction<StockInfo> {
    let defaults = StockInfo {
        symbol: labels.unknown_symbol.to_string(),
        period: labels.default_period.to_string(),
        data_summary: labels.default_summary.to_string(),
    };

    let map = match parse_object(raw) {
        Ok(map) => map,
        Err(reason) => return Extraction::Fallback { value: defaults, reason },
    };
    let Some(symbol) = text_field(&map, &["stock", "symbol"]) else {
        return Extraction::Fallback {
            value: defaults,
            reason: "missing field \"stock\"".to_string(),
        };
    };

    let data_summary = match (text_field(&map, &["prices"]), labels.lang) {
        (Some(n), "en") => format!("Contains {n} price data points"),
        (Some(n), _) => format!("包含{n}个价格数据点"),
        (None, _) => defaults.data_summary,
    };

    Extraction::Parsed(StockInfo {
        symbol,
        period: text_field(&map, &["period"]).unwrap_or_else(|| labels.custom_period.to_string()),
        data_summary,
    })
}

fn extract_chart(raw: &str, labels: &Labels) -> Extraction<ChartInfo> {
    let defaults = ChartInfo {
        path: String::new(),
        description: labels.default_chart_description.to_string(),
    };

    let map = match parse_object(raw) {
        Ok(map) => map,
        Err(reason) => return Extraction::Fallback { value: defaults, reason },
    };
    let Some(path) = text_field(&map, &["chart_path", "plot_file_path"]) else {
        return Extraction::Fallback {
            value: defaults,
            reason: "missing field \"chart_path\"".to_string(),
        };
    };

    Extraction::Parsed(ChartInfo {
        path,
        description: text_field(&map, &["chart_description"]).unwrap_or(defaults.description),
    })
}

fn extract_analysis(raw: &str, labels: &Labels) -> Extraction<AnalysisInfo> {
    let recommendation = labels.default_recommendation.to_string();

    match parse_object(raw) {
        Ok(map) => match text_field(&map, &["analysis"]) {
            Some(analysis) => Extraction::Parsed(AnalysisInfo {
                analysis,
                recommendation: text_field(&map, &["recommendation"]).unwrap_or(recommendation),
            }),
            None => Extraction::Fallback {
                value: AnalysisInfo {
                    analysis: raw.trim().to_string(),
                    recommendation,
                },
                reason: "missing field \"analysis\"".to_string(),
            },
        },
        Err(reason) => {
            let analysis = if raw.trim().is_empty() {
                labels.default_analysis.to_string()
            } else {
                raw.trim().to_string()
            };
            Extraction::Fallback {
                value: AnalysisInfo {
                    analysis,
                    recommendation,
                },
                reason,
            }
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Markdown,
}

impl ReportFormat {
    /// `html` selects HTML; anything else selects Markdown
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("html") {
            ReportFormat::Html
        } else {
            ReportFormat::Markdown
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReportParams {
    #[serde(default)]
    chart_data: String,
    #[serde(default)]
    analysis_content: String,
    #[serde(default)]
    stock_data: String,
    #[serde(default = "default_format")]
    output_format: String,
}

fn default_format() -> String {
    "html".to_string()
}

/// Result of saving a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedReport {
    pub path: String,
    pub format: &'static str,
    pub fallbacks: Vec<&'static str>,
}

/// Tool writing the final report to disk
pub struct SaveReportTool {
    reports_dir: PathBuf,
    language: Language,
    env: Environment<'static>,
}

impl SaveReportTool {
    /// Create the tool from the team configuration
    pub fn new(config: &StockConfig) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("report.html", HTML_TEMPLATE)?;
        env.add_template("report.md", MARKDOWN_TEMPLATE)?;

        Ok(Self {
            reports_dir: config.reports_dir(),
            language: config.language,
            env,
        })
    }

    fn save(&self, params: &ReportParams) -> Result<SavedReport> {
        let labels = labels(self.language);
        let stock = extract_stock(&params.stock_data, &labels);
        let chart = extract_chart(&params.chart_data, &labels);
        let analysis = extract_analysis(&params.analysis_content, &labels);

        let mut fallbacks = Vec::new();
        for (field, reason) in [
            ("stock_data", stock.fallback_reason()),
            ("chart_data", chart.fallback_reason()),
            ("analysis_content", analysis.fallback_reason()),
        ] {
            if let Some(reason) = reason {
                warn!(field, reason, "Report input fell back to defaults");
                fallbacks.push(field);
            }
        }

        let format = ReportFormat::parse(&params.output_format);
        let template = self.env.get_template(&format!("report.{}", format.extension()))?;
        let rendered = template.render(context! {
            labels => labels,
            generated_at => Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            stock => stock.value(),
            chart => chart.value(),
            analysis => analysis.value(),
        })?;

        std::fs::create_dir_all(&self.reports_dir)?;
        let file_name = format!(
            "stock_analysis_report_{}.{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        );
        let path = self.reports_dir.join(file_name);
        std::fs::write(&path, rendered)?;

        info!(path = %path.display(), format = format.name(), fallbacks = fallbacks.len(), "Report saved");
        Ok(SavedReport {
            path: path.to_string_lossy().into_owned(),
            format: format.name(),
            fallbacks,
        })
    }
}

#[async_trait]
impl Tool for SaveReportTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: ReportParams = parse_params(self.name(), params)?;
        let saved = self.save(&params)?;
        Ok(json!(saved))
    }

    fn name(&self) -> &'static str {
        "save_report"
    }

    fn description(&self) -> &'static str {
        "Save the analysis results to a report file. Pass JSON strings: stock_data with stock, \
         period and prices; chart_data with chart_path and chart_description; analysis_content \
         with analysis and recommendation."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "chart_data": schema::string("JSON with chart_path and chart_description"),
                "analysis_content": schema::string("JSON with analysis and recommendation, or plain text"),
                "stock_data": schema::string("JSON with stock, period and prices"),
                "output_format": schema::string_enum("Report format", &["html", "markdown"]),
            }),
            vec![],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(dir: &std::path::Path, language: Language) -> SaveReportTool {
        let config = StockConfig::builder()
            .output_dir(dir)
            .language(language)
            .build()
            .unwrap();
        SaveReportTool::new(&config).unwrap()
    }

    #[test]
    fn test_stock_extraction() {
        let labels = labels(Language::English);
        let parsed = extract_stock(
            r#"  {"stock": "600519.SS", "period": "2024-10 to 2025-10", "prices": 243}"#,
            &labels,
        );
        assert_eq!(
            parsed,
            Extraction::Parsed(StockInfo {
                symbol: "600519.SS".to_string(),
                period: "2024-10 to 2025-10".to_string(),
                data_summary: "Contains 243 price data points".to_string(),
            })
        );

        let no_period = extract_stock(r#"{"stock": "AAPL"}"#, &labels);
        assert_eq!(no_period.value().period, "custom period");
        assert!(no_period.fallback_reason().is_none());

        let text = extract_stock("Apple Inc.", &labels);
        assert_eq!(text.value().symbol, "unknown");
        assert!(text.fallback_reason().is_some());

        let broken = extract_stock(r#"{"stock": "#, &labels);
        assert!(broken.fallback_reason().unwrap().contains("invalid JSON"));
    }

    #[test]
    fn test_chart_extraction_accepts_plot_path() {
        let labels = labels(Language::Chinese);
        let chart = extract_chart(r#"{"plot_file_path": "./output/charts/a.png"}"#, &labels);
        assert_eq!(chart.value().path, "./output/charts/a.png");
        assert_eq!(chart.value().description, "股票价格走势图");

        let missing = extract_chart(r#"{"description": "x"}"#, &labels);
        assert!(missing.fallback_reason().unwrap().contains("chart_path"));
    }

    #[test]
    fn test_analysis_extraction() {
        let labels = labels(Language::English);
        let parsed = extract_analysis(r#"{"analysis": "Strong uptrend", "recommendation": "Hold"}"#, &labels);
        assert_eq!(parsed.value().recommendation, "Hold");
        assert!(parsed.fallback_reason().is_none());

        let raw = extract_analysis("The stock looks weak.", &labels);
        assert_eq!(raw.value().analysis, "The stock looks weak.");
        assert_eq!(raw.value().recommendation, labels.default_recommendation);
        assert!(raw.fallback_reason().is_some());

        let empty = extract_analysis("", &labels);
        assert_eq!(empty.value().analysis, labels.default_analysis);
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(ReportFormat::parse("html"), ReportFormat::Html);
        assert_eq!(ReportFormat::parse("HTML "), ReportFormat::Html);
        assert_eq!(ReportFormat::parse("markdown"), ReportFormat::Markdown);
        assert_eq!(ReportFormat::parse("pdf"), ReportFormat::Markdown);
    }

    #[tokio::test]
    async fn test_html_report_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool(dir.path(), Language::English);

        let output = tool
            .execute(json!({
                "stock_data": r#"{"stock": "AAPL", "prices": 250}"#,
                "chart_data": r#"{"chart_path": "output/charts/AAPL.png"}"#,
                "analysis_content": "<script>alert(1)</script> price < 200",
            }))
            .await
            .unwrap();

        assert_eq!(output["format"], "html");
        assert_eq!(output["fallbacks"], json!(["analysis_content"]));

        let path = output["path"].as_str().unwrap();
        assert!(path.ends_with(".html"));
        assert!(path.contains("stock_analysis_report_"));
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("AAPL"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[tokio::test]
    async fn test_markdown_report_with_all_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool(dir.path(), Language::Chinese);

        let output = tool
            .execute(json!({"output_format": "markdown"}))
            .await
            .unwrap();

        assert_eq!(output["format"], "markdown");
        assert_eq!(
            output["fallbacks"],
            json!(["stock_data", "chart_data", "analysis_content"])
        );
        let path = output["path"].as_str().unwrap();
        assert!(path.ends_with(".md"));
        let markdown = std::fs::read_to_string(path).unwrap();
        assert!(markdown.starts_with("# 股票分析报告"));
        assert!(markdown.contains("请根据个人风险承受能力做出投资决策。"));
    }
}
