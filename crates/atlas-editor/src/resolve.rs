//! Interaction resolver: pointer event → what the UI should do.
//!
//! Order of precedence:
//!
//! 1. An active drawing session swallows every pointer event.
//! 2. A pin under the pointer is the only candidate (pins paint on top).
//! 3. Otherwise every region containing the point, in document order.
//!
//! The dispatch policy then turns the candidate list into a direct
//! navigation, a preview, a tooltip, or a menu. It never picks one target
//! on the user's behalf when more than one is possible.
//!
//! | Candidates | Click | Hover | Context |
//! |------------|-------|-------|---------|
//! | 0 | no-op | no-op | create pin / draw region (authoring) |
//! | 1, one link | navigate | preview | links + edit/delete |
//! | 1, two links | menu | tooltip of name + both links | links + edit/delete |
//! | many | menu of every link | tooltip of every name | links + edit/delete |
//!
//! Hover never navigates or opens a menu: a single annotation linking both
//! a page and a map shows a tooltip naming it and listing each link.

use atlas_core::config::EngineConfig;
use atlas_core::geometry::{ImagePoint, to_image_space};
use atlas_core::host::TitleResolver;
use atlas_core::model::{AnnotationHandle, MapDocument, Target, TargetKind};
use atlas_core::shape::RegionKind;
use atlas_render::hit::{Candidate, candidates_at};

use crate::input::{InteractionKind, PointerEvent};
use crate::session::{DrawFeedback, DrawingSession};

/// Something the user can pick.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open a linked page or map. `path` is `None` when the title did not
    /// resolve; the host decides how to report that.
    Open {
        kind: TargetKind,
        title: String,
        path: Option<String>,
    },
    CreatePin { at: ImagePoint },
    DrawRegion { kind: RegionKind },
    Edit { handle: AnnotationHandle },
    Delete { handle: AnnotationHandle },
}

impl Action {
    pub fn is_navigation(&self) -> bool {
        matches!(self, Action::Open { .. })
    }
}

/// A labelled action, tagged with the annotation it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub label: String,
    pub action: Action,
    pub source: Option<AnnotationHandle>,
}

/// Outcome of one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing to do.
    Ignored,
    /// Consumed by the drawing session.
    Drawing(DrawFeedback),
    /// Exactly one possible target: go there now.
    Navigate(MenuEntry),
    /// Hover over a single-link annotation.
    Preview(MenuEntry),
    /// Disambiguation or context menu.
    Menu(Vec<MenuEntry>),
    /// Hover text listing names or links, no navigation.
    Tooltip(Vec<String>),
}

impl Resolution {
    /// Every entry offered, whatever the presentation.
    pub fn entries(&self) -> &[MenuEntry] {
        match self {
            Resolution::Navigate(e) | Resolution::Preview(e) => std::slice::from_ref(e),
            Resolution::Menu(entries) => entries,
            _ => &[],
        }
    }

    /// Whether this resolution navigates without asking.
    pub fn is_direct_navigation(&self) -> bool {
        matches!(self, Resolution::Navigate(_))
    }
}

/// Resolve a pointer event against `doc`.
///
/// `doc` must be the live cached document; `session` is the view's own
/// drawing session.
pub fn resolve_interaction(
    doc: &MapDocument,
    session: &mut DrawingSession,
    event: &PointerEvent,
    config: &EngineConfig,
    titles: &dyn TitleResolver,
) -> Resolution {
    if let Some(feedback) = session.handle(event, doc.render_height()) {
        return Resolution::Drawing(feedback);
    }

    let at = event.position();
    let candidates = candidates_at(doc, config.pin_marker, at);
    log::trace!(
        "{:?} at ({}, {}): {} candidate(s)",
        event.kind,
        at.x,
        at.y,
        candidates.len()
    );

    match event.kind {
        InteractionKind::Click => resolve_click(&candidates, titles),
        InteractionKind::Hover => resolve_hover(&candidates, titles),
        InteractionKind::Context => {
            let image_point = to_image_space(at, doc.render_height());
            resolve_context(&candidates, image_point, config, titles)
        }
        InteractionKind::DoubleClick => Resolution::Ignored,
    }
}

fn open_entry(
    target: Target,
    source: &Candidate<'_>,
    qualify: bool,
    titles: &dyn TitleResolver,
) -> MenuEntry {
    let label = if qualify {
        format!("Open {}: {} ({})", target.kind, target.title, source.display_name())
    } else {
        format!("Open {}: {}", target.kind, target.title)
    };
    let path = titles.resolve_title(target.kind, &target.title);
    MenuEntry {
        label,
        action: Action::Open {
            kind: target.kind,
            title: target.title,
            path,
        },
        source: Some(source.handle()),
    }
}

/// Navigation entries for every candidate, flattened in candidate order.
/// Labels name the source annotation when more than one is involved.
fn navigation_entries(candidates: &[Candidate<'_>], titles: &dyn TitleResolver) -> Vec<MenuEntry> {
    let qualify = candidates.len() > 1;
    candidates
        .iter()
        .flat_map(|c| {
            c.targets()
                .list()
                .into_iter()
                .map(move |t| open_entry(t, c, qualify, titles))
        })
        .collect()
}

fn resolve_click(candidates: &[Candidate<'_>], titles: &dyn TitleResolver) -> Resolution {
    let mut entries = navigation_entries(candidates, titles);
    match (candidates.len(), entries.len()) {
        (_, 0) => Resolution::Ignored,
        (1, 1) => Resolution::Navigate(entries.remove(0)),
        _ => Resolution::Menu(entries),
    }
}

fn resolve_hover(candidates: &[Candidate<'_>], titles: &dyn TitleResolver) -> Resolution {
    match candidates {
        [] => Resolution::Ignored,
        [only] => {
            let targets = only.targets().list();
            match targets.len() {
                0 => match only.label() {
                    Some(label) => Resolution::Tooltip(vec![label.to_string()]),
                    None => Resolution::Ignored,
                },
                1 => {
                    let target = targets.into_iter().next();
                    match target {
                        Some(t) => Resolution::Preview(open_entry(t, only, false, titles)),
                        None => Resolution::Ignored,
                    }
                }
                _ => {
                    let mut lines = vec![only.display_name()];
                    lines.extend(targets.iter().map(|t| format!("{}: {}", t.kind, t.title)));
                    Resolution::Tooltip(lines)
                }
            }
        }
        many => Resolution::Tooltip(many.iter().map(Candidate::display_name).collect()),
    }
}

fn resolve_context(
    candidates: &[Candidate<'_>],
    at: ImagePoint,
    config: &EngineConfig,
    titles: &dyn TitleResolver,
) -> Resolution {
    if candidates.is_empty() {
        if !config.authoring {
            return Resolution::Ignored;
        }
        return Resolution::Menu(vec![
            MenuEntry {
                label: "Create pin here".to_string(),
                action: Action::CreatePin { at },
                source: None,
            },
            MenuEntry {
                label: "Draw region".to_string(),
                action: Action::DrawRegion {
                    kind: RegionKind::Polygon,
                },
                source: None,
            },
        ]);
    }

    let qualify = candidates.len() > 1;
    let mut entries = Vec::new();
    for c in candidates {
        entries.extend(
            c.targets()
                .list()
                .into_iter()
                .map(|t| open_entry(t, c, qualify, titles)),
        );
        if config.authoring {
            let suffix = if qualify {
                format!(" ({})", c.display_name())
            } else {
                String::new()
            };
            let handle = c.handle();
            entries.push(MenuEntry {
                label: format!("Edit{suffix}"),
                action: Action::Edit { handle },
                source: Some(handle),
            });
            entries.push(MenuEntry {
                label: format!("Delete{suffix}"),
                action: Action::Delete { handle },
                source: Some(handle),
            });
        }
    }

    if entries.is_empty() {
        Resolution::Ignored
    } else {
        Resolution::Menu(entries)
    }
}
