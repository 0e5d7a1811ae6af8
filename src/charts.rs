//! Shared ECharts plumbing for pages that render charts.
//!
//! Pages build chart configurations with the `charming` crate, pair each one
//! with the ID of its HTML container in a [ChartPanel], and include the output
//! of [charts_script] in the page head so the browser initializes them.

use charming::element::JsFunction;
use maud::{Markup, PreEscaped, html};

use crate::html::HeadElement;

/// A chart with the ID of its HTML container and its ECharts configuration.
pub struct ChartPanel {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl ChartPanel {
    fn container(&self) -> Markup {
        html!(
            div
                id=(self.id)
                class="min-h-[380px] rounded dark:bg-gray-100"
            {}
        )
    }

    /// The script that draws this chart, resizes it with the window, and
    /// follows the browser's dark mode preference.
    fn init_script(&self) -> String {
        format!(
            r#"(function() {{
                const chart = echarts.init(document.getElementById("{id}"));
                chart.setOption({options});

                window.addEventListener('resize', chart.resize);

                const darkMode = window.matchMedia('(prefers-color-scheme: dark)');
                const applyTheme = () => chart.setTheme(darkMode.matches ? 'dark' : 'default');
                darkMode.addEventListener('change', applyTheme);
                applyTheme();
            }})();"#,
            id = self.id,
            options = self.options
        )
    }
}

/// Render an empty container div for each chart, laid out in a two column
/// grid on wide screens.
///
/// The container IDs must match the panels passed to [charts_script], which
/// is what actually draws the charts.
pub fn charts_view(charts: &[ChartPanel]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    (chart.container())
                }
            }
        }
    )
}

/// Build the script that initializes every chart once the page has loaded.
pub fn charts_script(charts: &[ChartPanel]) -> HeadElement {
    let init_scripts = charts
        .iter()
        .map(ChartPanel::init_script)
        .collect::<Vec<_>>()
        .join("\n");

    let on_load = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{init_scripts}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(on_load))
}

/// A JavaScript formatter that renders chart values as dollar amounts.
#[inline]
pub fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        r#"const dollars = new Intl.NumberFormat('en-US', { style: 'currency', currency: 'USD' });
        return (number) ? dollars.format(number) : "-";"#,
    )
}
