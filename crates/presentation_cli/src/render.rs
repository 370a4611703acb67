//! Plain-text rendering of command results

use std::fmt::Write;

use application::{ProviderStatus, UnavailableReason};
use domain::{AgronomicIndices, ForecastBundle, Observation, PredictionBundle};

pub fn current(bundle: &ForecastBundle) -> String {
    let now = bundle.current();
    let mut out = format!(
        "🌤️  {} ({})\n   {:.1} °C, feels like {:.1} °C, {}\n   Humidity {:.0}%, wind {:.1} m/s, pressure {:.0} hPa\n",
        bundle.location().name,
        bundle.source().display_name(),
        now.temperature(),
        now.feels_like(),
        now.description(),
        now.humidity(),
        now.wind_speed(),
        now.pressure(),
    );
    for alert in bundle.alerts() {
        let _ = writeln!(out, "   ⚠️  {} [{:?}]", alert.title, alert.severity);
    }
    out
}

pub fn forecast(bundle: &ForecastBundle) -> String {
    let mut out = format!(
        "📅 {} day forecast for {} ({})\n",
        bundle.daily().len(),
        bundle.location().name,
        bundle.source().display_name()
    );
    for day in bundle.daily() {
        let _ = writeln!(
            out,
            "   {}  {:>5.1} / {:>5.1} °C  {:>5.1} mm ({:.0}%)  {}",
            day.date(),
            day.temp_min(),
            day.temp_max(),
            day.precipitation_total(),
            day.precipitation_probability(),
            day.description()
        );
    }
    out
}

pub fn history(observations: &[Observation]) -> String {
    let mut out = format!("🕰️  {} hourly observations\n", observations.len());
    for o in observations {
        let _ = writeln!(
            out,
            "   {}  {:>5.1} °C  {:>3.0}%  {:>4.1} mm",
            o.timestamp().format("%Y-%m-%d %H:%M"),
            o.temperature(),
            o.humidity(),
            o.precipitation()
        );
    }
    out
}

pub fn agriculture(days: &[AgronomicIndices]) -> String {
    let Some(first) = days.first() else {
        return "🌾 No forecast days\n".to_string();
    };
    let mut out = format!("🌾 Agronomic outlook ({})\n", first.crop);
    for day in days {
        let _ = writeln!(
            out,
            "   {}  GDD {:>4.1} (Σ {:>5.1})  ET {:.1} mm  irrigation {}  planting {}  spraying {}  harvest {}",
            day.date,
            day.growing_degree_days,
            day.cumulative_gdd,
            day.evapotranspiration,
            day.irrigation,
            day.planting,
            day.spraying,
            day.harvest
        );
    }
    out
}

pub fn prediction(bundle: &PredictionBundle) -> String {
    let metrics = bundle.metrics();
    let mut out = format!(
        "🔮 {}-hour prediction ({})\n",
        bundle.horizon_hours(),
        bundle.model_version()
    );
    for (i, confidence) in bundle.confidence().iter().enumerate() {
        let _ = writeln!(
            out,
            "   +{:>2}h  {:>5.1} °C  rain {:>3.0}%  confidence {:.2}",
            i + 1,
            metrics.temperature[i],
            metrics.precipitation_probability[i] * 100.0,
            confidence
        );
    }
    out
}

pub fn providers(statuses: &[ProviderStatus]) -> String {
    if statuses.is_empty() {
        return "📡 No providers configured\n".to_string();
    }
    let mut out = "📡 Provider fallback order\n".to_string();
    for status in statuses {
        let _ = writeln!(
            out,
            "   {}. {:<16} reliability {:.2}",
            status.priority,
            status.provider.display_name(),
            status.reliability
        );
    }
    out
}

pub fn unavailable(reason: &UnavailableReason) -> String {
    match reason {
        UnavailableReason::AllProvidersFailed { attempts } => {
            let mut out = "❌ All providers failed\n".to_string();
            for attempt in attempts {
                let _ = writeln!(
                    out,
                    "   {} ({:?}): {}",
                    attempt.provider, attempt.kind, attempt.message
                );
            }
            out
        },
        UnavailableReason::NoProviderAttempted => {
            "❌ No configured provider supports this request\n".to_string()
        },
        UnavailableReason::DeadlineExceeded => "⏱️  Deadline exceeded\n".to_string(),
        UnavailableReason::InsufficientHistory {
            available_hours,
            required_hours,
        } => format!(
            "❌ Not enough history: {available_hours} contiguous hours, {required_hours} needed\n"
        ),
        UnavailableReason::PredictionFailed { message } => {
            format!("❌ Prediction failed: {message}\n")
        },
        UnavailableReason::Internal { message } => format!("❌ Internal error: {message}\n"),
    }
}
