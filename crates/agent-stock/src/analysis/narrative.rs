//! Human readable wording derived from the trend

use super::metrics::Trend;
use crate::config::Language;

impl Trend {
    /// Display label
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Trend::Uptrend, Language::English) => "uptrend",
            (Trend::Downtrend, Language::English) => "downtrend",
            (Trend::Consolidating, Language::English) => "consolidating",
            (Trend::InsufficientData, Language::English) => "insufficient data",
            (Trend::Uptrend, Language::Chinese) => "上涨趋势",
            (Trend::Downtrend, Language::Chinese) => "下跌趋势",
            (Trend::Consolidating, Language::Chinese) => "横盘整理",
            (Trend::InsufficientData, Language::Chinese) => "数据不足",
        }
    }
}

/// Placeholder for a moving average the history is too short for
pub fn insufficient_data(language: Language) -> &'static str {
    Trend::InsufficientData.label(language)
}

/// One-sentence description of the chart
pub fn chart_description(ticker: &str, trend: Trend, language: Language) -> String {
    match (language, trend) {
        (Language::English, Trend::Uptrend) => format!(
            "Over the past year {ticker} has been rising, trading above its moving averages with buyers in control."
        ),
        (Language::English, Trend::Downtrend) => format!(
            "Over the past year {ticker} has been falling, trading below its moving averages with sellers in control."
        ),
        (Language::English, _) => format!(
            "Over the past year {ticker} has been moving sideways, oscillating around its moving averages."
        ),
        (Language::Chinese, Trend::Uptrend) => format!(
            "股价走势图显示，{ticker}在过去一年中呈现上涨态势，价格在移动平均线上方运行，显示多头力量占据主导。"
        ),
        (Language::Chinese, Trend::Downtrend) => format!(
            "股价走势图显示，{ticker}在过去一年中呈现下跌态势，价格在移动平均线下方运行，空头力量较强。"
        ),
        (Language::Chinese, _) => format!(
            "股价走势图显示，{ticker}在过去一年中呈现横盘整理态势，价格在移动平均线附近震荡。"
        ),
    }
}

/// Factors that could move the price up
pub fn potential_drivers(trend: Trend, language: Language) -> Vec<String> {
    let items: [&str; 3] = match (language, trend) {
        (Language::English, Trend::Uptrend) => [
            "Technical indicators point to a bullish trend",
            "Price broke through key resistance",
            "Volume confirms the advance",
        ],
        (Language::English, Trend::Downtrend) => [
            "Potential rebound after the sell-off",
            "Indicators approaching oversold levels",
            "Price near support",
        ],
        (Language::English, _) => [
            "Direction to be decided after consolidation",
            "Indicators recovering",
            "Market in wait-and-see mode",
        ],
        (Language::Chinese, Trend::Uptrend) => {
            ["技术指标显示多头趋势", "价格突破关键阻力位", "成交量配合上涨"]
        }
        (Language::Chinese, Trend::Downtrend) => {
            ["超跌反弹机会", "技术指标接近超卖", "支撑位附近"]
        }
        (Language::Chinese, _) => ["整理后方向选择", "技术指标修复", "市场观望情绪"],
    };
    items.iter().map(ToString::to_string).collect()
}

/// Factors that could move the price down
pub fn potential_risks(trend: Trend, language: Language) -> Vec<String> {
    let items: [&str; 3] = match (language, trend) {
        (Language::English, Trend::Uptrend) => [
            "Profit-taking pressure",
            "Indicators overbought",
            "Broad market volatility",
        ],
        (Language::English, Trend::Downtrend) => [
            "Downtrend may continue",
            "Weak technical picture",
            "Pessimistic sentiment",
        ],
        (Language::English, _) => [
            "No clear direction",
            "Shrinking volume",
            "Lack of catalysts",
        ],
        (Language::Chinese, Trend::Uptrend) => ["获利回吐压力", "技术指标超买", "市场整体波动"],
        (Language::Chinese, Trend::Downtrend) => ["下跌趋势延续", "技术面疲弱", "市场情绪悲观"],
        (Language::Chinese, _) => ["方向不明确", "成交量萎缩", "市场缺乏催化剂"],
    };
    items.iter().map(ToString::to_string).collect()
}

/// Recommendation sentence
///
/// Uptrend suggests holding or adding, consolidation suggests waiting, and
/// anything else suggests avoiding risk.
pub fn recommendation(trend: Trend, language: Language) -> String {
    let label = trend.label(language);
    match language {
        Language::English => {
            let advice = match trend {
                Trend::Uptrend => "hold or moderately add to positions",
                Trend::Consolidating => "wait and see",
                _ => "avoid risk",
            };
            format!("Based on technical analysis the stock is in a {label}; we suggest to {advice}.")
        }
        Language::Chinese => {
            let advice = match trend {
                Trend::Uptrend => "持有或适量增持",
                Trend::Consolidating => "谨慎观望",
                _ => "规避风险",
            };
            format!("基于技术分析，当前{label}，建议{advice}。")
        }
    }
}

/// Summary of the price trend with the three-month change
pub fn price_trend(trend: Trend, current_price: f64, period_change: f64, language: Language) -> String {
    let label = trend.label(language);
    match language {
        Language::English => {
            let mut text = format!("Over the past year: {label}; current price {current_price:.2}.");
            if period_change != 0.0 {
                let direction = if period_change > 0.0 { "up" } else { "down" };
                text.push_str(&format!(
                    " {direction} {:.1}% compared with three months ago.",
                    period_change.abs()
                ));
            }
            text
        }
        Language::Chinese => {
            let mut text = format!("过去一年股价{label}，当前价格为{current_price:.2}。");
            if period_change != 0.0 {
                let direction = if period_change > 0.0 { "上涨" } else { "下跌" };
                text.push_str(&format!("相比三个月前{direction}{:.1}%。", period_change.abs()));
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_by_trend() {
        assert!(recommendation(Trend::Uptrend, Language::Chinese).contains("持有或适量增持"));
        assert!(recommendation(Trend::Consolidating, Language::Chinese).contains("谨慎观望"));
        assert!(recommendation(Trend::Downtrend, Language::Chinese).contains("规避风险"));
        assert!(recommendation(Trend::InsufficientData, Language::English).contains("avoid risk"));
    }

    #[test]
    fn test_wording_falls_back_to_consolidating() {
        assert_eq!(
            potential_drivers(Trend::InsufficientData, Language::Chinese),
            potential_drivers(Trend::Consolidating, Language::Chinese)
        );
        assert_eq!(
            chart_description("AAPL", Trend::InsufficientData, Language::English),
            chart_description("AAPL", Trend::Consolidating, Language::English)
        );
    }

    #[test]
    fn test_price_trend_mentions_period_change() {
        let text = price_trend(Trend::Downtrend, 10.0, -12.34, Language::English);
        assert!(text.contains("down 12.3%"));

        let flat = price_trend(Trend::Consolidating, 10.0, 0.0, Language::Chinese);
        assert!(!flat.contains("相比三个月前"));
    }
}
