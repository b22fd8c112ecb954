//! Interactive HTML rendering of comparison reports.
//!
//! The output is one self-contained file: stylesheet and script are inlined,
//! filtering and toggles run client-side.

use super::markup::HtmlWriter;
use super::options::{HtmlOptions, Theme};
use crate::annotate::Annotation;
use crate::error::{Error, Result};
use crate::model::{Block, CellDiff, ChangeKind, ChangeRecord, SubDiff, Table, TableDiff};
use crate::report::{Report, ReportEntry};
use std::fs;
use std::path::Path;

const STYLE: &str = r#"<style>
:root {
  --bg: #f7f7f8; --panel: #ffffff; --muted: #666; --text: #111;
  --accent: #007bff; --card-border: #eee; --chip-bg: #fff;
}
body { font-family: Arial, sans-serif; margin: 20px; background: var(--bg); color: var(--text); }
.container { max-width: 1100px; margin: 0 auto; }
.header { display: flex; align-items: center; justify-content: space-between; gap: 12px; margin-bottom: 12px; }
.controls { margin-bottom: 12px; }
.chip { border: 1px solid #ddd; padding: 6px 10px; border-radius: 16px; margin-right: 6px; cursor: pointer; display: inline-block; background: var(--chip-bg); color: var(--text); transition: 0.18s; }
.chip:hover { transform: translateY(-1px); }
.chip.active { box-shadow: 0 0 0 2px rgba(0,0,0,0.06); border-color: #bbb; }
.score { font-weight: bold; padding: 2px 6px; border-radius: 6px; margin-left: 8px; }
.score.low { background: #d4fcbc; color: #083; }
.score.med { background: #fcebb6; color: #6a4a00; }
.score.high { background: #f8b4b4; color: #7a0000; }
.toc { margin-bottom: 12px; }
.toc a { text-decoration: none; margin-right: 6px; color: var(--accent); font-size: 0.9em; }
.toc a:hover { text-decoration: underline; }
.card { background: var(--panel); padding: 10px; border-radius: 8px; border: 1px solid var(--card-border); margin-bottom: 8px; }
.added { background-color: #e6fbde; }
.deleted { background-color: #ffecec; }
.changed { background-color: #fff7e0; }
.unchanged { background-color: var(--panel); color: #6b6b6b; }
table { border-collapse: collapse; margin-bottom: 10px; width: 100%; }
td, th { border: 1px solid #d0d0d0; padding: 6px; vertical-align: top; }
td.cell-changed { background: rgba(255, 200, 0, 0.12); }
.diff { background: #f4f4f4; padding: 8px; overflow: auto; border-radius: 6px; white-space: pre-wrap; }
.meta { color: var(--muted); font-size: 0.9em; margin-bottom: 6px; display: flex; gap: 8px; align-items: center; }
.badge { font-size: 0.85em; padding: 3px 6px; border-radius: 6px; background: #f1f1f1; margin-right: 6px; }
.small { font-size: 0.9em; }
.annotation { background: #f9fafb; border-left: 4px solid #bbb; padding: 6px 8px; border-radius: 6px; margin-bottom: 6px; }
body.dark {
  --bg: #0f1114; --panel: #15181b; --muted: #b4b7ba; --text: #f1f4f7;
  --accent: #66a6ff; --card-border: #2a2d31; --chip-bg: #1b1e22;
}
body.dark .badge { background: #2a2e33; color: #f3f5f8; border: 1px solid #3a3e43; }
body.dark .annotation { background: #202327; border-left-color: #66a6ff; }
body.dark .diff { background: #1c1f22; border: 1px solid #33373b; }
body.dark .added { background-color: #1b3a20; color: #d6f5dc; }
body.dark .deleted { background-color: #3a1b1b; color: #f6caca; }
body.dark .changed { background-color: #3a351b; color: #fff2c2; }
body.dark .unchanged { background-color: var(--panel); color: #999; }
body.dark del { background: #662929; color: #ffbaba; }
body.dark ins { background: #285f3a; color: #c8ffda; }
del { background: #ffd6d6; text-decoration: line-through; padding: 0 2px; border-radius: 2px; }
ins { background: #d6ffd8; text-decoration: none; padding: 0 2px; border-radius: 2px; }
</style>"#;

const SCRIPT: &str = r#"<script>
function applyFilters() {
  var kinds = Array.from(document.querySelectorAll('.chip.change.active')).map(function (c) { return c.dataset.val; });
  var types = Array.from(document.querySelectorAll('.chip.type.active')).map(function (c) { return c.dataset.val; });
  var hideUnchanged = document.body.classList.contains('hide-unchanged');
  document.querySelectorAll('[data-change]').forEach(function (n) {
    var show = true;
    if (kinds.length && kinds.indexOf(n.dataset.change) === -1) show = false;
    if (types.length && types.indexOf(n.dataset.type) === -1) show = false;
    if (hideUnchanged && n.dataset.change === 'unchanged') show = false;
    n.style.display = show ? '' : 'none';
  });
}
document.addEventListener('DOMContentLoaded', function () {
  document.querySelectorAll('.chip.change, .chip.type').forEach(function (c) {
    c.addEventListener('click', function () { c.classList.toggle('active'); applyFilters(); });
  });
  var collapse = document.querySelector('.collapse-toggle');
  if (collapse) {
    collapse.addEventListener('click', function () {
      var hidden = document.body.classList.toggle('hide-unchanged');
      collapse.textContent = hidden ? 'Show unchanged' : 'Hide unchanged';
      applyFilters();
    });
  }
  var theme = document.querySelector('.dark-toggle');
  if (theme) {
    theme.addEventListener('click', function () {
      var dark = document.body.classList.toggle('dark');
      theme.textContent = dark ? 'Mode: dark' : 'Mode: light';
    });
  }
  document.querySelectorAll('.toc a').forEach(function (a) {
    a.addEventListener('click', function (e) {
      var el = document.getElementById(a.getAttribute('href').slice(1));
      if (el) { e.preventDefault(); el.style.display = ''; el.scrollIntoView({ behavior: 'smooth', block: 'center' }); }
    });
  });
  applyFilters();
});
</script>"#;

/// Render a report as a self-contained HTML document.
pub fn to_html(report: &Report, options: &HtmlOptions) -> String {
    let mut w = HtmlWriter::new();

    w.raw("<!DOCTYPE html>");
    w.open("html", &[("lang", "en")]);
    w.open("head", &[]);
    w.void("meta", &[("charset", "utf-8")]);
    w.element("title", &[], &options.title);
    w.raw(STYLE);
    w.raw(SCRIPT);
    w.close("head");

    let body_class = body_class(options);
    w.open("body", &[("class", body_class.as_str())]);
    w.open("div", &[("class", "container")]);

    render_header(&mut w, report, options);
    render_summary(&mut w, report);
    render_filters(&mut w, report);
    render_toc(&mut w, report, options);

    let collapse_label = if options.show_unchanged {
        "Hide unchanged"
    } else {
        "Show unchanged"
    };
    w.open("div", &[("class", "controls")])
        .element("button", &[("class", "chip collapse-toggle")], collapse_label)
        .close("div");

    for entry in &report.entries {
        render_entry(&mut w, entry, options);
    }

    w.close("div").close("body").close("html");
    w.finish()
}

/// Render a report as HTML and write it to `path`.
pub fn write_html(report: &Report, options: &HtmlOptions, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let html = to_html(report, options);
    fs::write(path, html).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote HTML report to {}", path.display());
    Ok(())
}

fn body_class(options: &HtmlOptions) -> String {
    let mut classes = Vec::new();
    if options.theme == Theme::Dark {
        classes.push("dark");
    }
    if !options.show_unchanged {
        classes.push("hide-unchanged");
    }
    classes.join(" ")
}

fn render_header(w: &mut HtmlWriter, report: &Report, options: &HtmlOptions) {
    let meta = &report.metadata;
    w.open("div", &[("class", "header")]);
    w.open("div", &[]);
    w.element("h1", &[], &options.title);
    if !meta.old_source.is_empty() || !meta.new_source.is_empty() {
        w.element(
            "div",
            &[("class", "small")],
            &format!("Old: {} | New: {}", meta.old_source, meta.new_source),
        );
    }
    w.element(
        "div",
        &[("class", "small")],
        &format!("Total blocks: {}", report.total_blocks()),
    );
    if let Some(at) = meta.generated_at {
        w.element(
            "div",
            &[("class", "small")],
            &format!("Generated: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        );
    }
    w.close("div");
    w.element(
        "button",
        &[("class", "chip dark-toggle")],
        options.theme.toggle_label(),
    );
    w.close("div");
}

fn render_summary(w: &mut HtmlWriter, report: &Report) {
    let totals = &report.stats.totals;
    w.open("div", &[("class", "card summary")]);
    w.element("b", &[], "Summary:");
    w.element("div", &[("class", "small")], &report.summary.text);
    w.element(
        "div",
        &[("class", "small")],
        &format!(
            "added: {} | deleted: {} | changed: {} | unchanged: {}",
            totals.added, totals.deleted, totals.changed, totals.unchanged
        ),
    );
    w.close("div");
}

fn render_filters(w: &mut HtmlWriter, report: &Report) {
    w.open("div", &[("class", "controls card")]);
    for kind in ChangeKind::ALL {
        let label = format!("{} ({})", kind, report.stats.totals.get(kind));
        w.element(
            "span",
            &[("class", "chip change"), ("data-val", kind.as_str())],
            &label,
        );
    }
    for (block_type, counts) in &report.stats.by_type {
        let label = format!("{} ({})", block_type, counts.total());
        w.element(
            "span",
            &[("class", "chip type"), ("data-val", block_type.as_str())],
            &label,
        );
    }
    w.close("div");
}

fn render_toc(w: &mut HtmlWriter, report: &Report, options: &HtmlOptions) {
    w.open("div", &[("class", "toc card")]);
    w.element("b", &[], "Most significant changes: ");
    if report.toc.is_empty() {
        w.element("span", &[("class", "small")], "none");
    }
    for entry in report.ranked().take(options.toc_limit) {
        let href = format!("#blk{}", entry.index);
        let label = match &entry.annotation {
            Some(annotation) => format!("{}/10", annotation.semantic_score),
            None => format!("s={}", entry.score),
        };
        let text = format!("#{}({}) {}", entry.index, entry.block_type(), label);
        w.element("a", &[("href", href.as_str())], &text);
    }
    w.close("div");
}

fn render_entry(w: &mut HtmlWriter, entry: &ReportEntry, options: &HtmlOptions) {
    let kind = entry.kind();
    let id = format!("blk{}", entry.index);
    let class = format!("card {}", kind);
    w.open(
        "div",
        &[
            ("id", id.as_str()),
            ("class", class.as_str()),
            ("data-change", kind.as_str()),
            ("data-type", entry.block_type()),
        ],
    );

    let score_class = format!("score {}", entry.severity().css_class());
    w.open("div", &[("class", "meta")])
        .element("span", &[("class", "badge")], &entry.block_type().to_uppercase())
        .element("span", &[("class", "small")], &format!("change: {}", kind))
        .element(
            "span",
            &[("class", score_class.as_str())],
            &format!("s={}", entry.score),
        )
        .close("div");

    if let Some(annotation) = &entry.annotation {
        render_annotation(w, annotation);
    }

    match &entry.change {
        ChangeRecord::Changed { old, new, detail } => {
            render_changed(w, old, new, detail.as_ref(), options)
        }
        ChangeRecord::Unchanged { block }
        | ChangeRecord::Added { block }
        | ChangeRecord::Deleted { block } => render_block(w, block, options),
    }

    w.close("div");
}

fn render_annotation(w: &mut HtmlWriter, annotation: &Annotation) {
    w.open("div", &[("class", "annotation")]);
    w.element("b", &[], "Analysis: ");
    for label in &annotation.labels {
        w.element("span", &[("class", "badge")], label);
    }
    w.element(
        "span",
        &[("class", "badge")],
        &format!("Type: {}", annotation.change_type),
    );
    w.element(
        "span",
        &[("class", "badge")],
        &format!("Relevance: {}/10", annotation.semantic_score),
    );
    w.element(
        "span",
        &[("class", "badge")],
        &format!("Confidence: {}", annotation.confidence),
    );
    w.close("div");
}

fn render_block(w: &mut HtmlWriter, block: &Block, options: &HtmlOptions) {
    match block {
        Block::Paragraph(p) => {
            w.element("p", &[("class", "small")], &p.text);
        }
        Block::Table(t) => render_table(w, t),
        Block::Image(img) => {
            w.element(
                "p",
                &[("class", "small")],
                &format!("ID={}", img.short_identifier(options.image_id_len)),
            );
        }
        Block::Unknown { tag } => {
            w.element(
                "p",
                &[("class", "small")],
                &format!("Unrecognized block type: {}", tag),
            );
        }
    }
}

fn render_changed(
    w: &mut HtmlWriter,
    old: &Block,
    new: &Block,
    detail: Option<&SubDiff>,
    options: &HtmlOptions,
) {
    match (old, new, detail) {
        (Block::Paragraph(a), Block::Paragraph(b), detail) => {
            labeled(w, "Old: ", &a.text);
            labeled(w, "New: ", &b.text);
            if let Some(SubDiff::Inline(diff)) = detail {
                w.open("div", &[("class", "small")])
                    .element("b", &[], "Inline diff:")
                    .open("div", &[("class", "diff")])
                    .inline_diff(diff)
                    .close("div")
                    .close("div");
            }
        }
        (Block::Table(_), Block::Table(_), Some(SubDiff::Table(diff))) => {
            render_table_diff(w, diff);
        }
        (Block::Image(a), Block::Image(b), _) => {
            labeled(w, "Old: ", &format!("ID={}", a.short_identifier(options.image_id_len)));
            labeled(w, "New: ", &format!("ID={}", b.short_identifier(options.image_id_len)));
        }
        _ => {
            if old.type_tag() != new.type_tag() {
                let replaced = format!("{} replaced by {}", old.type_tag(), new.type_tag());
                w.element("p", &[("class", "small")], &replaced);
            }
            render_block(w, old, options);
            render_block(w, new, options);
        }
    }
}

fn labeled(w: &mut HtmlWriter, label: &str, text: &str) {
    w.open("p", &[("class", "small")])
        .element("b", &[], label)
        .text(text)
        .close("p");
}

fn render_table(w: &mut HtmlWriter, table: &Table) {
    if let Some(sheet) = &table.sheet {
        w.element("div", &[("class", "small")], &format!("Sheet: {}", sheet));
    }
    w.open("table", &[]);
    for row in &table.rows {
        w.open("tr", &[]);
        for cell in row {
            w.element("td", &[], cell);
        }
        w.close("tr");
    }
    w.close("table");
}

fn render_table_diff(w: &mut HtmlWriter, diff: &TableDiff) {
    w.open("table", &[]);
    for row in &diff.rows {
        w.open("tr", &[]);
        for cell in row {
            match cell {
                CellDiff::Same { text } => {
                    w.element("td", &[], text);
                }
                CellDiff::Changed { inline, .. } => {
                    w.open("td", &[("class", "cell-changed")])
                        .inline_diff(inline)
                        .close("td");
                }
            }
        }
        w.close("tr");
    }
    w.close("table");
}
