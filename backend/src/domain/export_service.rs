//! Snapshot export for the family tree.
//!
//! Renders the currently visible tree (collapse state, search filter and
//! female filter all respected) into a framed SVG document: the content box
//! is sized to the full unclipped extent of the visible rows, wrapped in a
//! double border with a watermark and date stamp, and offered for download
//! or written straight to disk.

use std::fs;

use chrono::Local;
use log::{error, info};
use shared::{ExportToPathResponse, ExportTreeResponse, MaritalStatus};

use crate::domain::errors::TreeError;
use crate::domain::tree::TreeNode;
use crate::domain::tree_view::{RenderChildren, RenderNode, TreeView};

const LEVEL_COLORS: [&str; 5] = ["blue", "red", "green", "navy", "darkred"];
const OUTER_BORDER: &str = "#8B4513";
const INNER_BORDER: &str = "#D2691E";
const WATERMARK: &str = "Family Tree";

const ROW_HEIGHT: usize = 24;
const CHAR_WIDTH: usize = 9;
const INDENT_STEP: usize = 24;
const PADDING: usize = 40;
const BORDER_WIDTH: usize = 3;
const WATERMARK_STRIP: usize = 30;

/// One drawn line of the snapshot.
struct SnapshotRow {
    indent: usize,
    text: String,
    color: String,
    is_member: bool,
}

#[derive(Clone)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Capture the visible tree into a framed SVG snapshot.
    pub fn render_snapshot(
        &self,
        view: &TreeView,
        forest: &[TreeNode],
    ) -> Result<ExportTreeResponse, TreeError> {
        let rendered = view.render(forest);

        let mut rows = Vec::new();
        for root in &rendered {
            collect_rows(root, 0, &mut rows);
        }

        let member_count = rows.iter().filter(|r| r.is_member).count();
        let svg_content = draw_svg(&rows);
        let today = Local::now().format("%Y-%m-%d");
        let filename = format!("family-tree-{}.svg", today);

        info!(
            "Exported tree snapshot: {} visible members, {} bytes",
            member_count,
            svg_content.len()
        );

        Ok(ExportTreeResponse {
            svg_content,
            filename,
            member_count,
        })
    }

    /// Render the snapshot and write it to `custom_path` (or the user's
    /// documents directory when none is given).
    pub fn export_to_path(
        &self,
        view: &TreeView,
        forest: &[TreeNode],
        custom_path: Option<String>,
    ) -> Result<ExportToPathResponse, TreeError> {
        let snapshot = self.render_snapshot(view, forest)?;

        let export_dir = match custom_path {
            Some(path) if !path.trim().is_empty() => {
                std::path::PathBuf::from(sanitize_path(&path))
            }
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("Could not determine default export directory");
                    return Ok(ExportToPathResponse {
                        success: false,
                        message: "Failed to determine export directory".to_string(),
                        file_path: String::new(),
                        member_count: 0,
                    });
                }
            },
        };

        let file_path = export_dir.join(&snapshot.filename);

        if let Some(parent) = file_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create export directory {:?}: {}", parent, e);
                return Ok(ExportToPathResponse {
                    success: false,
                    message: format!("Failed to create export directory: {}", e),
                    file_path: parent.to_string_lossy().to_string(),
                    member_count: 0,
                });
            }
        }

        match fs::write(&file_path, &snapshot.svg_content) {
            Ok(()) => {
                let file_path = file_path.to_string_lossy().to_string();
                info!(
                    "Exported {} visible members to {}",
                    snapshot.member_count, file_path
                );
                Ok(ExportToPathResponse {
                    success: true,
                    message: format!("Tree exported successfully to: {}", file_path),
                    file_path,
                    member_count: snapshot.member_count,
                })
            }
            Err(e) => {
                error!("Failed to write export file {:?}: {}", file_path, e);
                Ok(ExportToPathResponse {
                    success: false,
                    message: format!("Failed to write export file: {}", e),
                    file_path: file_path.to_string_lossy().to_string(),
                    member_count: 0,
                })
            }
        }
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_rows(node: &RenderNode, indent: usize, rows: &mut Vec<SnapshotRow>) {
    let mut text = node.display_name.clone();
    let single_and_gone = node.marital_status == MaritalStatus::Single && !node.is_alive;
    if node.child_count > 0 && !single_and_gone {
        text.push_str(&format!(" ({})", node.child_count));
    }

    let color = if node.is_alive {
        LEVEL_COLORS[node.depth % LEVEL_COLORS.len()].to_string()
    } else {
        "black".to_string()
    };

    rows.push(SnapshotRow {
        indent,
        text,
        color,
        is_member: true,
    });

    match &node.children {
        RenderChildren::Collapsed => {}
        RenderChildren::Flat(children) => {
            for child in children {
                collect_rows(child, indent + 1, rows);
            }
        }
        RenderChildren::GroupedBySpouse(groups) => {
            for group in groups {
                rows.push(SnapshotRow {
                    indent: indent + 1,
                    text: group.label.clone(),
                    color: "#666666".to_string(),
                    is_member: false,
                });
                for child in &group.children {
                    collect_rows(child, indent + 2, rows);
                }
            }
        }
    }
}

fn draw_svg(rows: &[SnapshotRow]) -> String {
    let content_width = rows
        .iter()
        .map(|r| r.indent * INDENT_STEP + r.text.chars().count() * CHAR_WIDTH)
        .max()
        .unwrap_or(0)
        .max(200);
    let content_height = rows.len() * ROW_HEIGHT;

    let width = content_width + 2 * (PADDING + BORDER_WIDTH);
    let height = content_height + 2 * (PADDING + BORDER_WIDTH) + WATERMARK_STRIP;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = width,
        h = height
    ));
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>\n",
        width, height
    ));
    // Outer and inner frame, drawn inside the canvas edge.
    svg.push_str(&format!(
        "  <rect x=\"1\" y=\"1\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
        width - 2,
        height - 2,
        OUTER_BORDER,
        BORDER_WIDTH
    ));
    svg.push_str(&format!(
        "  <rect x=\"{o}\" y=\"{o}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>\n",
        width - 2 * (BORDER_WIDTH + 5),
        height - 2 * (BORDER_WIDTH + 5),
        INNER_BORDER,
        o = BORDER_WIDTH + 5
    ));

    for (i, row) in rows.iter().enumerate() {
        let x = PADDING + BORDER_WIDTH + row.indent * INDENT_STEP;
        let y = PADDING + BORDER_WIDTH + i * ROW_HEIGHT + ROW_HEIGHT / 2;
        let weight = if row.is_member { "normal" } else { "bold" };
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"14\" font-weight=\"{}\" fill=\"{}\">{}</text>\n",
            x,
            y,
            weight,
            row.color,
            escape_xml(&row.text)
        ));
    }

    let baseline = height - BORDER_WIDTH - 10;
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"16\" font-weight=\"bold\" fill=\"{}\">{}</text>\n",
        PADDING + BORDER_WIDTH,
        baseline,
        OUTER_BORDER,
        WATERMARK
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"12\" fill=\"#999999\" text-anchor=\"end\">Date: {}</text>\n",
        width - PADDING - BORDER_WIDTH,
        baseline,
        Local::now().format("%Y-%m-%d")
    ));

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Clean up a user-supplied destination path: surrounding quotes, escaped
/// spaces, trailing separators and a leading tilde.
fn sanitize_path(path: &str) -> String {
    let mut cleaned = path.trim().to_string();

    if (cleaned.starts_with('"') && cleaned.ends_with('"'))
        || (cleaned.starts_with('\'') && cleaned.ends_with('\''))
    {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    cleaned = cleaned.trim().replace("\\ ", " ");

    while cleaned.ends_with('/') || cleaned.ends_with('\\') {
        cleaned.pop();
    }

    if cleaned.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            if cleaned == "~" {
                cleaned = home.to_string_lossy().to_string();
            } else if let Some(rest) = cleaned.strip_prefix("~/") {
                cleaned = home.join(rest).to_string_lossy().to_string();
            }
        }
    }

    cleaned
}
