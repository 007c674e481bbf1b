//! Built-in report view
//!
//! Renders the form state of a report as the document tree the pipeline
//! captures: one `page` section per printed page, form controls carrying the
//! field values, and an off-screen chart region.

use crate::settings::AppSettings;
use irshad_common::dom::{
    Element, Node, CHART_REGION_CLASS, HEADING_LEVEL_ATTR, NO_PRINT_CLASS, OFFSCREEN_CLASS,
    PAGE_CLASS,
};
use irshad_common::export::chart::{format_value, BarChart};
use irshad_common::types::Trend;
use irshad_common::{Cycle, ReportData, ReportKind};

pub const ROOT_ID: &str = "report-root";

const CHART_CANVAS_WIDTH: u32 = 760;
const CHART_CANVAS_HEIGHT: u32 = 300;

/// Document tree for `data` rendered as a `kind` report
pub fn render(data: &ReportData, kind: ReportKind, settings: &AppSettings) -> Element {
    // level names and titles follow the configured cycle; band labels stay as they are
    let data = &ReportData {
        title: settings.cycle.substitute(&data.title),
        level: settings.cycle.substitute(&data.level),
        ..data.clone()
    };

    let mut pages = vec![cover_page(data, kind, settings), results_page(data)];
    if !data.subjects.is_empty() {
        pages.push(subjects_page(data));
    }
    if !data.top_performers.is_empty() {
        pages.push(top_performers_page(data));
    }
    pages.push(notes_page(data, settings));

    Element::new("div")
        .with_attr("id", ROOT_ID)
        .with_attr("dir", "rtl")
        .with_children(pages)
        .with_child(chart_region(data))
}

/// Rewrite cycle-specific words in every text node and field value of a template
pub fn apply_cycle(el: &mut Element, cycle: Cycle) {
    for attr in ["value", "placeholder"] {
        if let Some(v) = el.attr(attr) {
            let replaced = cycle.substitute(v);
            el.set_attr(attr, replaced);
        }
    }
    for child in el.children.iter_mut() {
        match child {
            Node::Text(t) => *t = cycle.substitute(t),
            Node::Element(c) => apply_cycle(c, cycle),
        }
    }
}

fn page() -> Element {
    Element::new("section")
        .with_class(PAGE_CLASS)
        .with_style("padding", "24px")
}

fn heading(level: u8, text: &str) -> Element {
    Element::new(&format!("h{}", level))
        .with_attr(HEADING_LEVEL_ATTR, level.to_string())
        .with_text(text)
}

fn input(value: &str, placeholder: &str) -> Element {
    Element::new("input")
        .with_attr("type", "text")
        .with_attr("value", value)
        .with_attr("placeholder", placeholder)
}

fn cell(tag: &str, content: impl Into<Node>) -> Element {
    Element::new(tag).with_child(content)
}

fn text_cell(tag: &str, text: &str) -> Element {
    Element::new(tag).with_text(text)
}

fn row(cells: Vec<Element>) -> Element {
    Element::new("tr").with_children(cells)
}

fn table(header: &[&str], rows: Vec<Element>) -> Element {
    let head = row(header.iter().map(|h| text_cell("th", h)).collect());
    Element::new("table")
        .with_style("width", "100%")
        .with_child(head)
        .with_children(rows)
}

fn cover_page(data: &ReportData, kind: ReportKind, settings: &AppSettings) -> Element {
    let school = if data.school.is_empty() {
        settings.school_name.as_str()
    } else {
        data.school.as_str()
    };
    let counselor = if data.counselor.is_empty() {
        settings.counselor_name.as_str()
    } else {
        data.counselor.as_str()
    };

    let field = |label: &str, value: &str, placeholder: &str| {
        row(vec![text_cell("th", label), cell("td", input(value, placeholder))])
    };

    page()
        .with_child(
            Element::new("p")
                .with_style("text-align", "center")
                .with_text("الجمهورية الجزائرية الديمقراطية الشعبية"),
        )
        .with_child(
            Element::new("p")
                .with_style("text-align", "center")
                .with_text(settings.cycle.education_label()),
        )
        .with_child(heading(1, kind.title()).with_style("text-align", "center"))
        .with_child(heading(2, &data.title).with_style("text-align", "center"))
        .with_child(
            Element::new("table")
                .with_style("width", "100%")
                .with_child(field(settings.cycle.institution(), school, "اسم المؤسسة"))
                .with_child(field("المستوى", &data.level, "المستوى"))
                .with_child(field("الفصل", &data.semester, "الفصل"))
                .with_child(field("التاريخ", &data.report_date, "التاريخ"))
                .with_child(field("مستشار التوجيه", counselor, "الاسم واللقب")),
        )
}

fn results_page(data: &ReportData) -> Element {
    let totals = &data.totals;
    let counts = row(vec![
        text_cell("td", &totals.excellent.to_string()),
        text_cell("td", &totals.good.to_string()),
        text_cell("td", &totals.average.to_string()),
        text_cell("td", &totals.weak.to_string()),
        text_cell("td", &totals.total_students.to_string()),
    ]);

    let mut page = page()
        .with_child(heading(2, "النتائج العامة"))
        .with_child(table(&["ممتاز", "جيد", "متوسط", "ضعيف", "المجموع"], vec![counts]))
        .with_child(
            Element::new("p")
                .with_text("المعدل العام: ")
                .with_child(Element::new("strong").with_text(format_value(data.average))),
        );

    if !totals.is_consistent() {
        page = page.with_child(
            Element::new("p")
                .with_class(NO_PRINT_CLASS)
                .with_style("color", "#b91c1c")
                .with_text(format!(
                    "تنبيه: مجموع الفئات {} لا يساوي عدد التلاميذ {}",
                    totals.banded_sum(),
                    totals.total_students
                )),
        );
    }
    page
}

fn trend_value(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "up",
        Trend::Down => "down",
        Trend::Stable => "stable",
    }
}

fn trend_select(trend: Trend) -> Element {
    Element::new("select")
        .with_attr("value", trend_value(trend))
        .with_children([Trend::Up, Trend::Down, Trend::Stable].into_iter().map(|t| {
            Element::new("option")
                .with_attr("value", trend_value(t))
                .with_text(t.label())
        }))
}

fn subjects_page(data: &ReportData) -> Element {
    let rows = data
        .subjects
        .iter()
        .map(|s| {
            row(vec![
                text_cell("td", &s.name),
                cell("td", input(&format_value(s.average), "0")),
                text_cell("td", s.evaluation().label()),
                cell("td", trend_select(s.trend)),
            ])
        })
        .collect();

    page()
        .with_child(heading(2, "تحليل نتائج المواد"))
        .with_child(table(&["المادة", "المعدل", "التقييم", "الاتجاه"], rows))
}

fn top_performers_page(data: &ReportData) -> Element {
    let rows = data
        .top_ten()
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            row(vec![
                text_cell("td", &(i + 1).to_string()),
                text_cell("td", &p.student_name),
                text_cell("td", &format_value(p.average)),
            ])
        })
        .collect();

    page()
        .with_child(heading(2, "قائمة المتفوقين"))
        .with_child(table(&["الرتبة", "الاسم واللقب", "المعدل"], rows))
}

fn notes_page(data: &ReportData, settings: &AppSettings) -> Element {
    let counselor = if data.counselor.is_empty() {
        &settings.counselor_name
    } else {
        &data.counselor
    };
    page()
        .with_child(heading(3, "ملاحظات واقتراحات"))
        .with_child(
            Element::new("textarea")
                .with_attr("placeholder", "ملاحظات")
                .with_text(data.notes.as_str()),
        )
        .with_child(
            Element::new("p")
                .with_style("text-align", "left")
                .with_style("margin-top", "32px")
                .with_text(format!("مستشار التوجيه: {}", counselor)),
        )
}

/// Charts laid out off screen; only captured or drawn on request
fn chart_region(data: &ReportData) -> Element {
    let charts = BarChart::for_report(data);
    Element::new("div")
        .with_class(CHART_REGION_CLASS)
        .with_class(OFFSCREEN_CLASS)
        .with_children(
            charts
                .iter()
                .map(|c| c.to_element(CHART_CANVAS_WIDTH, CHART_CANVAS_HEIGHT)),
        )
}
