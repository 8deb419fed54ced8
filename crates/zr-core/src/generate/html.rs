//! HTML report generator
//!
//! Renders a self-contained document (inline styles, no external assets) with
//! a fixed section skeleton: header, weather, field overview, alerts,
//! comparative analysis, footer. Sections without data keep their heading and
//! show a placeholder so that consumers can rely on the layout.

use super::generator::{ensure_finite, GenerationContext, Generator};
use crate::artifact::Body;
use crate::error::GenerationError;
use crate::payload::{Alert, ExportPayload, FieldComparison, FieldRecord, WeatherSnapshot};
use crate::types::{FormatKind, Locale};
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; color: #333; }
        .header { text-align: center; border-bottom: 2px solid #4CAF50; padding-bottom: 20px; margin-bottom: 30px; }
        .logo { font-size: 24px; font-weight: bold; color: #4CAF50; }
        .report-title { font-size: 20px; margin: 10px 0; }
        .report-date { color: #666; font-size: 14px; }
        .section { margin: 30px 0; padding: 20px; border: 1px solid #ddd; border-radius: 8px; }
        .section-title { font-size: 18px; font-weight: bold; color: #4CAF50; margin-bottom: 15px; border-bottom: 1px solid #eee; padding-bottom: 5px; }
        .placeholder { color: #999; font-style: italic; }
        .field-card { background: #f9f9f9; padding: 15px; margin: 10px 0; border-radius: 5px; border-left: 4px solid #4CAF50; }
        .field-name { font-weight: bold; font-size: 16px; margin-bottom: 10px; }
        .metrics-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 10px; margin: 10px 0; }
        .metric { background: white; padding: 10px; border-radius: 4px; text-align: center; border: 1px solid #eee; }
        .metric-label { font-size: 12px; color: #666; margin-bottom: 5px; }
        .metric-value { font-size: 16px; font-weight: bold; color: #333; }
        .alert { padding: 10px; margin: 5px 0; border-radius: 4px; border-left: 4px solid #ff9800; }
        .alert.info { background: #d1ecf1; border-color: #17a2b8; }
        .alert.warning { background: #fff3cd; border-color: #ff9800; }
        .alert.critical { background: #f8d7da; border-color: #dc3545; }
        .weather-summary { background: #e3f2fd; padding: 15px; border-radius: 8px; margin: 10px 0; }
        .footer { margin-top: 50px; text-align: center; color: #666; font-size: 12px; border-top: 1px solid #eee; padding-top: 20px; }
"#;

/// Localized labels used by the report
#[derive(Debug, Clone, Copy)]
pub struct ReportStrings {
    pub brand: &'static str,
    pub report_title: &'static str,
    pub generated_on: &'static str,
    pub weather_summary: &'static str,
    pub current_conditions: &'static str,
    pub temperature: &'static str,
    pub humidity: &'static str,
    pub wind_speed: &'static str,
    pub field_overview: &'static str,
    pub unnamed_field: &'static str,
    pub crop_type: &'static str,
    pub area: &'static str,
    pub hectares: &'static str,
    pub planting_date: &'static str,
    pub health_score: &'static str,
    pub active_alerts: &'static str,
    pub time: &'static str,
    pub comparative_analysis: &'static str,
    /// `{}` is replaced by the field count
    pub comparison_intro: &'static str,
    pub no_data: &'static str,
    pub not_available: &'static str,
    pub footer_generated_by: &'static str,
    pub footer_contact: &'static str,
}

impl ReportStrings {
    /// Labels for a locale
    pub fn for_locale(locale: Locale) -> &'static ReportStrings {
        match locale {
            Locale::En => &EN,
            Locale::Ar => &AR,
        }
    }
}

static EN: ReportStrings = ReportStrings {
    brand: "Zr3i 3.0",
    report_title: "Agricultural Field Report",
    generated_on: "Generated on",
    weather_summary: "Weather Summary",
    current_conditions: "Current Conditions",
    temperature: "Temperature",
    humidity: "Humidity",
    wind_speed: "Wind Speed",
    field_overview: "Field Overview",
    unnamed_field: "Unnamed Field",
    crop_type: "Crop Type",
    area: "Area",
    hectares: "hectares",
    planting_date: "Planting Date",
    health_score: "Health Score",
    active_alerts: "Active Alerts",
    time: "Time",
    comparative_analysis: "Comparative Analysis",
    comparison_intro: "Comparison of {} fields based on vegetation indices and performance metrics.",
    no_data: "No data available.",
    not_available: "N/A",
    footer_generated_by: "This report was generated by Zr3i 3.0 - Agriculture Platform As A Service",
    footer_contact: "For more information, visit our platform or contact support.",
};

static AR: ReportStrings = ReportStrings {
    brand: "Zr3i 3.0",
    report_title: "تقرير الحقول الزراعية",
    generated_on: "تاريخ الإنشاء",
    weather_summary: "ملخص الطقس",
    current_conditions: "الأحوال الحالية",
    temperature: "درجة الحرارة",
    humidity: "الرطوبة",
    wind_speed: "سرعة الرياح",
    field_overview: "نظرة عامة على الحقول",
    unnamed_field: "حقل بدون اسم",
    crop_type: "نوع المحصول",
    area: "المساحة",
    hectares: "هكتار",
    planting_date: "تاريخ الزراعة",
    health_score: "مؤشر الصحة",
    active_alerts: "التنبيهات النشطة",
    time: "الوقت",
    comparative_analysis: "التحليل المقارن",
    comparison_intro: "مقارنة {} حقول بناءً على مؤشرات الغطاء النباتي ومقاييس الأداء.",
    no_data: "لا توجد بيانات متاحة.",
    not_available: "غير متوفر",
    footer_generated_by: "تم إنشاء هذا التقرير بواسطة Zr3i 3.0 - منصة الزراعة كخدمة",
    footer_contact: "لمزيد من المعلومات، تفضل بزيارة منصتنا أو تواصل مع الدعم.",
};

/// Inputs of one report, borrowed from the payload
struct ReportData<'a> {
    fields: &'a [FieldRecord],
    weather: Option<&'a WeatherSnapshot>,
    alerts: &'a [Alert],
    comparisons: &'a [FieldComparison],
}

/// HTML report generator
pub struct HtmlReportGenerator {
    /// Overrides the localized report title
    title: Option<String>,
}

impl HtmlReportGenerator {
    /// Create a generator with localized titles
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Override the report title
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Render a report document
    fn render(
        &self,
        data: &ReportData<'_>,
        ctx: &GenerationContext<'_>,
    ) -> Result<String, GenerationError> {
        let s = ReportStrings::for_locale(ctx.locale);
        let title = self.title.as_deref().unwrap_or(s.report_title);
        let mut out = String::with_capacity(8 * 1024);

        let _ = writeln!(out, "<!DOCTYPE html>");
        let _ = writeln!(
            out,
            "<html lang=\"{}\" dir=\"{}\">",
            ctx.locale,
            if ctx.locale.is_rtl() { "rtl" } else { "ltr" }
        );
        let _ = writeln!(out, "<head>");
        let _ = writeln!(out, "    <meta charset=\"UTF-8\">");
        let _ = writeln!(out, "    <title>{} - {}</title>", escape(s.brand), escape(title));
        let _ = writeln!(out, "    <style>{}    </style>", STYLE);
        let _ = writeln!(out, "</head>");
        let _ = writeln!(out, "<body>");

        let _ = writeln!(out, "    <div class=\"header\">");
        let _ = writeln!(out, "        <div class=\"logo\">{}</div>", escape(s.brand));
        let _ = writeln!(out, "        <div class=\"report-title\">{}</div>", escape(title));
        let _ = writeln!(
            out,
            "        <div class=\"report-date\">{} {}</div>",
            s.generated_on,
            ctx.exported_at.format("%Y-%m-%d")
        );
        let _ = writeln!(out, "    </div>");

        out.push_str(&render_weather(data.weather, s));
        ctx.guard.check()?;
        out.push_str(&render_fields(data.fields, s, ctx)?);
        out.push_str(&render_alerts(data.alerts, s));
        out.push_str(&render_comparisons(data.comparisons, s));

        let _ = writeln!(out, "    <div class=\"footer\">");
        let _ = writeln!(out, "        <p>{}</p>", s.footer_generated_by);
        let _ = writeln!(out, "        <p>{}</p>", s.footer_contact);
        let _ = writeln!(out, "    </div>");
        let _ = writeln!(out, "</body>");
        let _ = writeln!(out, "</html>");

        Ok(out)
    }
}

impl Default for HtmlReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for HtmlReportGenerator {
    fn generate(
        &self,
        payload: &ExportPayload,
        ctx: &GenerationContext<'_>,
    ) -> Result<Body, GenerationError> {
        ensure_finite(payload)?;

        let data = match payload {
            ExportPayload::ComprehensiveReport {
                fields,
                weather,
                alerts,
                comparisons,
            } => ReportData {
                fields,
                weather: weather.as_ref(),
                alerts,
                comparisons,
            },
            ExportPayload::ComparativeAnalysis { comparisons } => ReportData {
                fields: &[],
                weather: None,
                alerts: &[],
                comparisons,
            },
            other => {
                return Err(GenerationError::Unsupported {
                    kind: other.kind(),
                    format: FormatKind::Html,
                })
            }
        };

        Ok(Body::text(self.render(&data, ctx)?, "html"))
    }

    fn format(&self) -> FormatKind {
        FormatKind::Html
    }
}

/// Escape text for HTML element and attribute content
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    escape(value.filter(|v| !v.is_empty()).unwrap_or(fallback))
}

fn number_or(value: Option<f64>, fallback: &str) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn index(value: Option<f64>) -> String {
    format!("{:.3}", value.unwrap_or(0.0))
}

fn section_open(out: &mut String, title: &str) {
    let _ = writeln!(out, "    <div class=\"section\">");
    let _ = writeln!(out, "        <div class=\"section-title\">{}</div>", title);
}

fn placeholder(out: &mut String, s: &ReportStrings) {
    let _ = writeln!(out, "        <p class=\"placeholder\">{}</p>", s.no_data);
}

fn metric(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "                <div class=\"metric\">");
    let _ = writeln!(out, "                    <div class=\"metric-label\">{}</div>", label);
    let _ = writeln!(out, "                    <div class=\"metric-value\">{}</div>", value);
    let _ = writeln!(out, "                </div>");
}

fn render_weather(weather: Option<&WeatherSnapshot>, s: &ReportStrings) -> String {
    let mut out = String::new();
    section_open(&mut out, s.weather_summary);

    match weather {
        Some(w) => {
            let na = s.not_available;
            let _ = writeln!(out, "        <div class=\"weather-summary\">");
            let _ = writeln!(
                out,
                "            <strong>{}:</strong> {}<br>",
                s.current_conditions,
                text_or(w.description.as_deref().or(w.condition.as_deref()), na)
            );
            let _ = writeln!(
                out,
                "            <strong>{}:</strong> {}°C<br>",
                s.temperature,
                number_or(w.temperature, na)
            );
            let _ = writeln!(
                out,
                "            <strong>{}:</strong> {}%<br>",
                s.humidity,
                number_or(w.humidity, na)
            );
            let _ = writeln!(
                out,
                "            <strong>{}:</strong> {} km/h",
                s.wind_speed,
                number_or(w.wind_speed, na)
            );
            let _ = writeln!(out, "        </div>");
        }
        None => placeholder(&mut out, s),
    }

    let _ = writeln!(out, "    </div>");
    out
}

fn render_fields(
    fields: &[FieldRecord],
    s: &ReportStrings,
    ctx: &GenerationContext<'_>,
) -> Result<String, GenerationError> {
    let mut out = String::new();
    section_open(&mut out, s.field_overview);

    if fields.is_empty() {
        placeholder(&mut out, s);
    }

    for (i, field) in fields.iter().enumerate() {
        if i % 64 == 63 {
            ctx.guard.check()?;
        }

        let indices = field.satellite_data.clone().unwrap_or_default();
        let _ = writeln!(out, "        <div class=\"field-card\">");
        let _ = writeln!(
            out,
            "            <div class=\"field-name\">{}</div>",
            text_or(field.name.as_deref(), s.unnamed_field)
        );
        let _ = writeln!(
            out,
            "            <p><strong>{}:</strong> {}</p>",
            s.crop_type,
            text_or(field.crop_type.as_deref(), s.not_available)
        );
        let _ = writeln!(
            out,
            "            <p><strong>{}:</strong> {} {}</p>",
            s.area,
            number_or(field.area, "0"),
            s.hectares
        );
        let _ = writeln!(
            out,
            "            <p><strong>{}:</strong> {}</p>",
            s.planting_date,
            text_or(field.planting_date.as_deref(), s.not_available)
        );
        let _ = writeln!(out, "            <div class=\"metrics-grid\">");
        metric(&mut out, "NDVI", &index(indices.ndvi));
        metric(&mut out, "NDMI", &index(indices.ndmi));
        metric(&mut out, "NDWI", &index(indices.ndwi));
        metric(
            &mut out,
            s.health_score,
            &format!("{}%", number_or(field.health_score, "0")),
        );
        let _ = writeln!(out, "            </div>");
        let _ = writeln!(out, "        </div>");
    }

    let _ = writeln!(out, "    </div>");
    Ok(out)
}

fn render_alerts(alerts: &[Alert], s: &ReportStrings) -> String {
    let mut out = String::new();
    section_open(&mut out, s.active_alerts);

    if alerts.is_empty() {
        placeholder(&mut out, s);
    }

    for alert in alerts {
        let time = alert
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| s.not_available.to_string());

        let _ = writeln!(
            out,
            "        <div class=\"alert {}\">",
            alert.severity.css_class()
        );
        let _ = writeln!(out, "            <strong>{}</strong><br>", escape(&alert.title));
        let _ = writeln!(out, "            {}<br>", escape(&alert.message));
        let _ = writeln!(out, "            <small>{}: {}</small>", s.time, time);
        let _ = writeln!(out, "        </div>");
    }

    let _ = writeln!(out, "    </div>");
    out
}

fn render_comparisons(comparisons: &[FieldComparison], s: &ReportStrings) -> String {
    let mut out = String::new();
    section_open(&mut out, s.comparative_analysis);

    if comparisons.is_empty() {
        placeholder(&mut out, s);
    } else {
        let _ = writeln!(
            out,
            "        <p>{}</p>",
            s.comparison_intro.replace("{}", &comparisons.len().to_string())
        );
        let _ = writeln!(out, "            <div class=\"metrics-grid\">");
        for c in comparisons {
            let ndvi = c.satellite.as_ref().and_then(|v| v.ndvi);
            metric(
                &mut out,
                &text_or(c.field.name.as_deref(), s.unnamed_field),
                &format!("NDVI: {}", index(ndvi)),
            );
        }
        let _ = writeln!(out, "            </div>");
    }

    let _ = writeln!(out, "    </div>");
    out
}
