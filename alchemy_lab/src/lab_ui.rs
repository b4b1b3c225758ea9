//! Lab side panel
//!
//! Element picker, the combine/reset/random buttons, the result card and the
//! session statistics, drawn with egui.

use egui::{Color32, Context, RichText};

use crate::category::AnimationCategory;
use crate::elements::Element;
use crate::molecule::Stage;
use crate::reactions::Reaction;
use crate::resolver::ResolvedOutcome;
use crate::session::LabSession;

/// What the user asked for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabAction {
    Select(&'static Element),
    Combine,
    Reset,
    Randomize,
}

/// Read-only view of the 3D scene for the status section
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneStatus {
    pub category: Option<AnimationCategory>,
    pub stage: Option<Stage>,
    pub meshes: usize,
    pub materials: usize,
    pub preview_running: bool,
}

const GRID_COLUMNS: usize = 6;

pub fn color32(rgb: u32) -> Color32 {
    Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Black or white, whichever reads better on `rgb`
pub fn text_on(rgb: u32) -> Color32 {
    let [r, g, b] = common::hex_rgb(rgb);
    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
    if luminance > 0.6 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Condition lines shown under a result: only temperatures above room
/// temperature, pressures above one atmosphere and named catalysts
pub fn condition_lines(reaction: &Reaction) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(t) = reaction.temperature.filter(|t| *t > 298.0) {
        lines.push(format!("Temperature: {} K", t));
    }
    if let Some(p) = reaction.pressure.filter(|p| *p > 1.0) {
        lines.push(format!("Pressure: {} atm", p));
    }
    if let Some(catalyst) = &reaction.catalyst {
        lines.push(format!("Catalyst: {}", catalyst));
    }
    lines
}

fn badge(ui: &mut egui::Ui, text: &str, rgb: u32) {
    egui::Frame::none()
        .fill(color32(rgb))
        .rounding(4.0)
        .inner_margin(egui::Margin::symmetric(6.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().strong().color(text_on(rgb)));
        });
}

pub fn draw_lab_panel(ctx: &Context, session: &LabSession, scene: &SceneStatus) -> Option<LabAction> {
    let mut action = None;

    egui::SidePanel::left("lab_panel")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading(RichText::new("⚗ Alchemy Lab").color(Color32::LIGHT_BLUE));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                selection_row(ui, session);
                ui.add_space(6.0);

                if let Some(picked) = element_grid(ui, session) {
                    action = Some(LabAction::Select(picked));
                }
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    let combine = egui::Button::new(RichText::new("Combine").strong());
                    if ui.add_enabled(session.can_combine(), combine).clicked() {
                        action = Some(LabAction::Combine);
                    }
                    if ui.button("Reset").clicked() {
                        action = Some(LabAction::Reset);
                    }
                    if ui.button("Random Mix").clicked() {
                        action = Some(LabAction::Randomize);
                    }
                });
                ui.label(RichText::new("Space combine · R reset · M random · Esc quit").small().weak());
                ui.separator();

                match session.last_outcome() {
                    Some(outcome) => result_card(ui, outcome),
                    None => {
                        ui.label(RichText::new("Pick two elements and combine them.").italics());
                    }
                }
                ui.separator();

                stats_section(ui, session);
                scene_section(ui, scene);
            });
        });

    action
}

fn selection_row(ui: &mut egui::Ui, session: &LabSession) {
    let selection = session.selection();
    let slot = |ui: &mut egui::Ui, element: Option<&'static Element>| match element {
        Some(e) => badge(ui, &format!("{} {}", e.symbol, e.name), e.color),
        None => {
            ui.label(RichText::new("?").monospace().weak());
        }
    };
    ui.horizontal(|ui| {
        slot(ui, selection.first());
        ui.label("+");
        slot(ui, selection.second());
    });
}

fn element_grid(ui: &mut egui::Ui, session: &LabSession) -> Option<&'static Element> {
    let selection = session.selection();
    let selected = |e: &Element| {
        [selection.first(), selection.second()]
            .iter()
            .flatten()
            .any(|s| s.symbol == e.symbol)
    };

    let mut picked = None;
    egui::Grid::new("element_grid")
        .num_columns(GRID_COLUMNS)
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for (i, element) in session.resolver().elements().all().iter().enumerate() {
                let mut button = egui::Button::new(
                    RichText::new(element.symbol).strong().color(text_on(element.color)),
                )
                .fill(color32(element.color))
                .min_size(egui::vec2(38.0, 30.0));
                if selected(element) {
                    button = button.stroke(egui::Stroke::new(2.0, Color32::WHITE));
                }
                let hover = format!(
                    "{} ({})\n{}\nDiscovered: {}",
                    element.name,
                    element.category.label(),
                    element.description,
                    element.discovery_label()
                );
                if ui.add(button).on_hover_text(hover).clicked() {
                    picked = Some(element);
                }
                if (i + 1) % GRID_COLUMNS == 0 {
                    ui.end_row();
                }
            }
        });
    picked
}

fn result_card(ui: &mut egui::Ui, outcome: &ResolvedOutcome) {
    let reaction = outcome.reaction();

    ui.label(RichText::new(reaction.product_name.as_ref()).heading().color(Color32::YELLOW));
    ui.label(RichText::new(reaction.product_formula.as_ref()).monospace().size(18.0));
    ui.horizontal_wrapped(|ui| {
        badge(ui, reaction.kind.label(), 0x4b5563);
        badge(ui, reaction.energy_change.label(), reaction.energy_change.color());
        badge(ui, reaction.difficulty.label(), reaction.difficulty.color());
    });
    ui.add_space(4.0);
    ui.label(reaction.description.as_ref());
    ui.add_space(4.0);
    ui.label(RichText::new(reaction.balanced_equation.as_ref()).monospace().color(Color32::WHITE));

    let (status, color) = if reaction.real_world {
        ("Real-world reaction", Color32::LIGHT_GREEN)
    } else {
        ("Does not happen in nature", Color32::LIGHT_RED)
    };
    ui.label(RichText::new(status).small().color(color));

    let conditions = condition_lines(reaction);
    if !conditions.is_empty() {
        ui.group(|ui| {
            ui.label(RichText::new("Conditions").strong());
            for line in &conditions {
                ui.label(RichText::new(line).small());
            }
        });
    }
    if let Some(explanation) = &reaction.explanation {
        ui.add_space(4.0);
        ui.label(RichText::new(explanation.as_ref()).italics());
    }
}

fn stats_section(ui: &mut egui::Ui, session: &LabSession) {
    let stats = session.stats();
    ui.collapsing(RichText::new("📊 Statistics").strong(), |ui| {
        egui::Grid::new("stats_grid").num_columns(2).spacing([10.0, 4.0]).show(ui, |ui| {
            ui.label("Experiments");
            ui.label(stats.experiments.to_string());
            ui.end_row();
            ui.label("Discovered");
            ui.label(format!("{} / {} ({}%)", stats.discovered, stats.total, stats.discovery_percent));
            ui.end_row();
        });
        if stats.is_master() {
            ui.label(RichText::new("Master alchemist: every reaction found").color(Color32::GOLD));
        }
    });
}

fn scene_section(ui: &mut egui::Ui, scene: &SceneStatus) {
    ui.collapsing(RichText::new("🔬 Scene").strong(), |ui| {
        let category = scene.category.map_or("empty".to_string(), |c| c.to_string());
        ui.label(format!("Molecule: {}", category));
        if let Some(stage) = scene.stage {
            ui.label(format!("Phase {} ({:.0}%)", stage.index + 1, stage.progress * 100.0));
        }
        ui.label(format!("GPU meshes: {}, materials: {}", scene.meshes, scene.materials));
        if scene.preview_running {
            ui.label(RichText::new("Preview running").color(Color32::LIGHT_GREEN));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ReactionResolver;

    #[test]
    fn test_color32_unpacks_rgb() {
        assert_eq!(color32(0x10b981), Color32::from_rgb(0x10, 0xb9, 0x81));
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(text_on(0xffffff), Color32::BLACK);
        assert_eq!(text_on(0x1a1a2e), Color32::WHITE);
    }

    #[test]
    fn test_room_conditions_are_hidden() {
        let resolver = ReactionResolver::standard();
        let mut reaction = resolver.resolve("H", "O").reaction().clone();
        reaction.temperature = Some(298.0);
        reaction.pressure = Some(1.0);
        reaction.catalyst = None;
        assert!(condition_lines(&reaction).is_empty());

        reaction.temperature = Some(773.0);
        reaction.pressure = Some(200.0);
        reaction.catalyst = Some("Iron".into());
        assert_eq!(
            condition_lines(&reaction),
            vec!["Temperature: 773 K", "Pressure: 200 atm", "Catalyst: Iron"]
        );
    }
}
