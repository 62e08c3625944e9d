//! Spatial entity store: cards, connections and free-form elements.
//!
//! The [`Board`] exclusively owns every entity. Connections refer to cards by
//! id only, and their endpoint positions are recomputed here whenever a card
//! moves or changes size.

use crate::error::{CanvasError, CanvasResult};
use crate::types::*;
use eframe::egui;
use serde::{Deserialize, Serialize};

/// What a world-space point lands on when hit-testing cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardHit {
    /// One of the card's resize handles
    Handle(CardId, ResizeHandle),
    /// The card body
    Body(CardId),
}

/// Partial update of a card's non-spatial fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    /// New title
    pub title: Option<String>,
    /// New body text
    pub content: Option<String>,
    /// New tag list
    pub tags: Option<Vec<String>>,
    /// New accent colour
    pub color: Option<CardColor>,
}

/// All entities on one canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Board {
    /// Cards in z-order (last is top-most)
    cards: Vec<Card>,
    /// Connections between cards
    connections: Vec<Connection>,
    /// Free-form elements in insertion order
    elements: Vec<CanvasElement>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the board to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from a JSON string.
    ///
    /// Card sizes are re-clamped, dangling connections pruned and every
    /// endpoint recomputed, so a hand-edited snapshot cannot break invariants.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut board: Board = serde_json::from_str(json)?;
        for card in &mut board.cards {
            card.size = clamp_card_size(card.size);
        }
        board.prune_dangling_connections();
        board.refresh_all_connections();
        Ok(board)
    }

    /// Cards in z-order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// All connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// All free-form elements in insertion order.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    /// Whether the board holds no cards and no elements.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.elements.is_empty()
    }

    /// Looks up a card.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    fn card_index(&self, id: CardId) -> CanvasResult<usize> {
        self.cards
            .iter()
            .position(|c| c.id == id)
            .ok_or(CanvasError::CardNotFound(id))
    }

    /// Adds a card on top of all others and returns its id.
    pub fn add_card(&mut self, mut card: Card) -> CardId {
        card.size = clamp_card_size(card.size);
        let id = card.id;
        self.cards.push(card);
        self.refresh_connections_for(id);
        id
    }

    /// Moves a card's top-left corner and updates every connection touching it.
    pub fn move_card(&mut self, id: CardId, position: egui::Pos2) -> CanvasResult<()> {
        let idx = self.card_index(id)?;
        self.cards[idx].position = position;
        self.refresh_connections_for(id);
        Ok(())
    }

    /// Resizes a card from `handle`, clamping `new_size` to the card limits.
    ///
    /// The edge or corner opposite `handle` keeps its world position; only
    /// [`ResizeHandle::SE`] leaves the card's origin untouched.
    pub fn resize_card(
        &mut self,
        id: CardId,
        handle: ResizeHandle,
        new_size: egui::Vec2,
    ) -> CanvasResult<CardGeometry> {
        let idx = self.card_index(id)?;
        let card = &mut self.cards[idx];
        let old = card.geometry();
        let size = clamp_card_size(new_size);
        let mut position = old.position;
        if handle.moves_left_edge() {
            position.x = old.position.x + (old.size.x - size.x);
        }
        if handle.moves_top_edge() {
            position.y = old.position.y + (old.size.y - size.y);
        }
        card.position = position;
        card.size = size;
        let geometry = card.geometry();
        self.refresh_connections_for(id);
        Ok(geometry)
    }

    /// Applies a partial update to a card's text, tags or colour.
    pub fn update_card(&mut self, id: CardId, patch: CardPatch) -> CanvasResult<()> {
        let idx = self.card_index(id)?;
        let card = &mut self.cards[idx];
        if let Some(title) = patch.title {
            card.title = title;
        }
        if let Some(content) = patch.content {
            card.content = content;
        }
        if let Some(tags) = patch.tags {
            card.tags = tags;
        }
        if let Some(color) = patch.color {
            card.color = color;
        }
        Ok(())
    }

    /// Moves a card to the top of the z-order.
    pub fn bring_card_to_front(&mut self, id: CardId) -> CanvasResult<()> {
        let idx = self.card_index(id)?;
        let card = self.cards.remove(idx);
        self.cards.push(card);
        Ok(())
    }

    /// Removes a card along with every connection that references it.
    ///
    /// Returns the card and the connections removed with it.
    pub fn delete_card(&mut self, id: CardId) -> CanvasResult<(Card, Vec<Connection>)> {
        let idx = self.card_index(id)?;
        let card = self.cards.remove(idx);
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.connections)
            .into_iter()
            .partition(|conn| conn.touches(id));
        self.connections = kept;
        Ok((card, removed))
    }

    /// Connects `from` to `to` with `style`.
    ///
    /// Self-connections are rejected before anything else is checked.
    pub fn add_connection(
        &mut self,
        from: CardId,
        to: CardId,
        style: ConnectionStyle,
    ) -> CanvasResult<ConnectionId> {
        if from == to {
            return Err(CanvasError::SelfConnection(from));
        }
        let from_card = self.card(from).ok_or(CanvasError::CardNotFound(from))?;
        let to_card = self.card(to).ok_or(CanvasError::CardNotFound(to))?;
        let connection = Connection::between(from_card, to_card, style);
        let id = connection.id;
        self.connections.push(connection);
        Ok(id)
    }

    /// Looks up a connection.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Removes a single connection.
    pub fn remove_connection(&mut self, id: ConnectionId) -> CanvasResult<Connection> {
        let idx = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or(CanvasError::ConnectionNotFound(id))?;
        Ok(self.connections.remove(idx))
    }

    /// Replaces a connection's style.
    pub fn set_connection_style(
        &mut self,
        id: ConnectionId,
        style: ConnectionStyle,
    ) -> CanvasResult<()> {
        let conn = self
            .connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CanvasError::ConnectionNotFound(id))?;
        conn.style = style;
        Ok(())
    }

    /// Connections with either end on `card`.
    pub fn connections_for(&self, card: CardId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.touches(card))
    }

    /// Drops connections whose cards no longer exist. Returns how many were removed.
    pub fn prune_dangling_connections(&mut self) -> usize {
        let before = self.connections.len();
        let cards = &self.cards;
        self.connections.retain(|conn| {
            cards.iter().any(|c| c.id == conn.from) && cards.iter().any(|c| c.id == conn.to)
        });
        before - self.connections.len()
    }

    fn refresh_connections_for(&mut self, id: CardId) {
        let Some(card) = self.cards.iter().find(|c| c.id == id) else {
            return;
        };
        let (out_anchor, in_anchor) = (card.right_middle(), card.left_middle());
        for conn in &mut self.connections {
            if conn.from == id {
                conn.from_position = out_anchor;
            }
            if conn.to == id {
                conn.to_position = in_anchor;
            }
        }
    }

    fn refresh_all_connections(&mut self) {
        let ids: Vec<CardId> = self.cards.iter().map(|c| c.id).collect();
        for id in ids {
            self.refresh_connections_for(id);
        }
    }

    /// Adds a free-form element and returns its id.
    pub fn add_element(&mut self, element: CanvasElement) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Looks up an element.
    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: ElementId) -> CanvasResult<&mut CanvasElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CanvasError::ElementNotFound(id))
    }

    /// Moves an element's top-left corner.
    pub fn move_element(&mut self, id: ElementId, position: egui::Pos2) -> CanvasResult<()> {
        self.element_mut(id)?.position = position;
        Ok(())
    }

    /// Replaces an element's payload.
    pub fn update_element(&mut self, id: ElementId, kind: ElementKind) -> CanvasResult<()> {
        self.element_mut(id)?.kind = kind;
        Ok(())
    }

    /// Sets an element's z-order hint.
    pub fn set_element_layer(&mut self, id: ElementId, layer: i32) -> CanvasResult<()> {
        self.element_mut(id)?.layer = layer;
        Ok(())
    }

    /// Removes an element.
    pub fn delete_element(&mut self, id: ElementId) -> CanvasResult<CanvasElement> {
        let idx = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(CanvasError::ElementNotFound(id))?;
        Ok(self.elements.remove(idx))
    }

    /// Elements in paint order: ascending layer, insertion order within a layer.
    pub fn elements_by_layer(&self) -> Vec<&CanvasElement> {
        let mut sorted: Vec<&CanvasElement> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.layer);
        sorted
    }

    /// Axis-aligned world bounds of every card and element, if any exist.
    pub fn content_bounds(&self) -> Option<egui::Rect> {
        self.cards
            .iter()
            .map(Card::rect)
            .chain(self.elements.iter().map(CanvasElement::rect))
            .reduce(|acc, r| acc.union(r))
    }

    /// Axis-aligned world bounds of the cards only.
    pub fn card_bounds(&self) -> Option<egui::Rect> {
        self.cards.iter().map(Card::rect).reduce(|acc, r| acc.union(r))
    }

    /// Finds the top-most card under `world`, preferring its resize handles.
    ///
    /// Only `handles_on` exposes handles. `handle_size` is the side of each
    /// handle's square hit box in world units, capped at half the card's
    /// shorter side so the body always stays reachable.
    pub fn hit_test_cards(
        &self,
        world: egui::Pos2,
        handle_size: f32,
        handles_on: Option<CardId>,
    ) -> Option<CardHit> {
        for card in self.cards.iter().rev() {
            if handles_on == Some(card.id) {
                let half = (handle_size / 2.0).min(card.size.min_elem() / 4.0);
                for handle in ResizeHandle::ALL {
                    let at = card.handle_position(handle);
                    if (world.x - at.x).abs() <= half && (world.y - at.y).abs() <= half {
                        return Some(CardHit::Handle(card.id, handle));
                    }
                }
            }
            if card.rect().contains(world) {
                return Some(CardHit::Body(card.id));
            }
        }
        None
    }

    /// Top-most card whose body contains `world`.
    pub fn card_at(&self, world: egui::Pos2) -> Option<CardId> {
        self.cards
            .iter()
            .rev()
            .find(|c| c.rect().contains(world))
            .map(|c| c.id)
    }

    /// Top-most element under `world`; sizeless elements use `tolerance` world units.
    pub fn element_at(&self, world: egui::Pos2, tolerance: f32) -> Option<ElementId> {
        self.elements_by_layer()
            .into_iter()
            .rev()
            .find(|e| e.rect().expand(tolerance).contains(world))
            .map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn card_at(x: f32, y: f32) -> Card {
        Card::new(egui::pos2(x, y))
    }

    fn assert_endpoints_consistent(board: &Board) {
        for conn in board.connections() {
            let from = board.card(conn.from).expect("from card exists");
            let to = board.card(conn.to).expect("to card exists");
            assert_eq!(
                conn.from_position,
                egui::pos2(from.position.x + from.size.x, from.position.y + from.size.y / 2.0)
            );
            assert_eq!(
                conn.to_position,
                egui::pos2(to.position.x, to.position.y + to.size.y / 2.0)
            );
        }
    }

    #[test]
    fn connecting_and_moving_matches_worked_example() {
        let mut board = Board::new();
        let a = board.add_card(card_at(0.0, 0.0));
        let b = board.add_card(card_at(500.0, 100.0));

        let cid = board.add_connection(a, b, ConnectionStyle::default()).unwrap();
        let conn = board.connection(cid).unwrap();
        assert_eq!(conn.from_position, egui::pos2(320.0, 120.0));
        assert_eq!(conn.to_position, egui::pos2(500.0, 220.0));

        board.move_card(a, egui::pos2(50.0, 50.0)).unwrap();
        let conn = board.connection(cid).unwrap();
        assert_eq!(conn.from_position, egui::pos2(370.0, 170.0));
        assert_eq!(conn.to_position, egui::pos2(500.0, 220.0));
    }

    #[test]
    fn endpoints_stay_consistent_after_mixed_edits() {
        let mut board = Board::new();
        let a = board.add_card(card_at(0.0, 0.0));
        let b = board.add_card(card_at(600.0, 0.0));
        let c = board.add_card(card_at(300.0, 500.0));
        board.add_connection(a, b, ConnectionStyle::default()).unwrap();
        board.add_connection(b, c, ConnectionStyle::default()).unwrap();
        board.add_connection(c, a, ConnectionStyle::default()).unwrap();

        board.move_card(b, egui::pos2(650.0, -40.0)).unwrap();
        board.resize_card(a, ResizeHandle::NW, egui::vec2(420.0, 300.0)).unwrap();
        board.resize_card(c, ResizeHandle::E, egui::vec2(700.0, 240.0)).unwrap();
        board.move_card(c, egui::pos2(-80.0, 720.0)).unwrap();
        board.resize_card(b, ResizeHandle::S, egui::vec2(320.0, 10.0)).unwrap();

        assert_endpoints_consistent(&board);
    }

    #[test]
    fn resize_keeps_opposite_edges_fixed_for_every_handle() {
        for handle in ResizeHandle::ALL {
            let mut board = Board::new();
            let id = board.add_card(card_at(100.0, 200.0));
            let before = board.card(id).unwrap().rect();
            let target = handle.resized(before.size(), egui::vec2(37.0, -23.0));
            board.resize_card(id, handle, target).unwrap();
            let after = board.card(id).unwrap().rect();

            if handle.moves_left_edge() {
                assert_eq!(after.max.x, before.max.x, "{handle:?} right edge");
            } else {
                assert_eq!(after.min.x, before.min.x, "{handle:?} left edge");
            }
            if handle.moves_top_edge() {
                assert_eq!(after.max.y, before.max.y, "{handle:?} bottom edge");
            } else {
                assert_eq!(after.min.y, before.min.y, "{handle:?} top edge");
            }
        }
    }

    #[test]
    fn resize_from_north_changes_height_and_keeps_bottom() {
        let mut board = Board::new();
        let id = board.add_card(card_at(0.0, 0.0));
        let dy = 40.0;
        board
            .resize_card(id, ResizeHandle::N, ResizeHandle::N.resized(egui::vec2(320.0, 240.0), egui::vec2(0.0, dy)))
            .unwrap();
        let card = board.card(id).unwrap();
        assert_eq!(card.size.y, 240.0 - dy);
        assert_eq!(card.position.y + card.size.y, 240.0);
    }

    #[test]
    fn resize_clamps_before_compensating() {
        let mut board = Board::new();
        let id = board.add_card(card_at(0.0, 0.0));
        let geometry = board
            .resize_card(id, ResizeHandle::NW, egui::vec2(5.0, 5.0))
            .unwrap();
        assert_eq!(geometry.size, egui::vec2(200.0, 150.0));
        assert_eq!(geometry.position, egui::pos2(120.0, 90.0));

        let geometry = board
            .resize_card(id, ResizeHandle::SE, egui::vec2(5000.0, 5000.0))
            .unwrap();
        assert_eq!(geometry.size, egui::vec2(800.0, 600.0));
        assert_eq!(geometry.position, egui::pos2(120.0, 90.0));
    }

    #[test]
    fn delete_cascades_only_to_touching_connections() {
        let mut board = Board::new();
        let a = board.add_card(card_at(0.0, 0.0));
        let b = board.add_card(card_at(400.0, 0.0));
        let c = board.add_card(card_at(800.0, 0.0));
        board.add_connection(a, b, ConnectionStyle::default()).unwrap();
        board.add_connection(b, c, ConnectionStyle::default()).unwrap();
        let kept = board.add_connection(a, c, ConnectionStyle::default()).unwrap();

        let (card, removed) = board.delete_card(b).unwrap();
        assert_eq!(card.id, b);
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|conn| conn.touches(b)));
        assert_eq!(board.connections().len(), 1);
        assert_eq!(board.connections()[0].id, kept);
    }

    #[test]
    fn self_connection_is_rejected() {
        let mut board = Board::new();
        let a = board.add_card(card_at(0.0, 0.0));
        assert_eq!(
            board.add_connection(a, a, ConnectionStyle::default()),
            Err(CanvasError::SelfConnection(a))
        );
        assert!(board.connections().is_empty());
    }

    #[test]
    fn unknown_ids_are_reported_without_mutation() {
        let mut board = Board::new();
        let a = board.add_card(card_at(0.0, 0.0));
        let snapshot = board.clone();
        let ghost = Uuid::new_v4();

        assert_eq!(board.move_card(ghost, egui::pos2(1.0, 1.0)), Err(CanvasError::CardNotFound(ghost)));
        assert!(matches!(
            board.resize_card(ghost, ResizeHandle::N, egui::vec2(300.0, 300.0)),
            Err(CanvasError::CardNotFound(_))
        ));
        assert!(board.delete_card(ghost).is_err());
        assert_eq!(
            board.add_connection(a, ghost, ConnectionStyle::default()),
            Err(CanvasError::CardNotFound(ghost))
        );
        assert!(board.remove_connection(ghost).is_err());
        assert!(board.move_element(ghost, egui::pos2(0.0, 0.0)).is_err());
        assert_eq!(board, snapshot);
    }

    #[test]
    fn prune_removes_connections_to_missing_cards() {
        let json = {
            let mut board = Board::new();
            let a = board.add_card(card_at(0.0, 0.0));
            let b = board.add_card(card_at(400.0, 0.0));
            board.add_connection(a, b, ConnectionStyle::default()).unwrap();
            let mut value: serde_json::Value = serde_json::from_str(&board.to_json().unwrap()).unwrap();
            value["cards"].as_array_mut().unwrap().remove(1);
            value.to_string()
        };
        let board = Board::from_json(&json).unwrap();
        assert_eq!(board.cards().len(), 1);
        assert!(board.connections().is_empty());
    }

    #[test]
    fn hit_test_prefers_top_card_and_handles() {
        let mut board = Board::new();
        let below = board.add_card(card_at(0.0, 0.0));
        let above = board.add_card(card_at(100.0, 100.0));

        let selected = Some(above);
        assert_eq!(board.hit_test_cards(egui::pos2(150.0, 150.0), 10.0, selected), Some(CardHit::Body(above)));
        assert_eq!(board.hit_test_cards(egui::pos2(50.0, 50.0), 10.0, selected), Some(CardHit::Body(below)));
        assert_eq!(
            board.hit_test_cards(egui::pos2(423.0, 342.0), 10.0, selected),
            Some(CardHit::Handle(above, ResizeHandle::SE))
        );
        assert_eq!(board.hit_test_cards(egui::pos2(-50.0, -50.0), 10.0, selected), None);

        board.bring_card_to_front(below).unwrap();
        assert_eq!(board.hit_test_cards(egui::pos2(150.0, 150.0), 10.0, selected), Some(CardHit::Body(below)));
    }

    #[test]
    fn handles_only_on_the_chosen_card() {
        let mut board = Board::new();
        let card = board.add_card(card_at(0.0, 0.0));
        // Bottom-right corner of a 320x240 card
        let corner = egui::pos2(319.0, 239.0);
        assert_eq!(board.hit_test_cards(corner, 10.0, None), Some(CardHit::Body(card)));
        assert_eq!(
            board.hit_test_cards(corner, 10.0, Some(card)),
            Some(CardHit::Handle(card, ResizeHandle::SE))
        );
    }

    #[test]
    fn oversized_handles_leave_the_body_reachable() {
        let mut board = Board::new();
        let card = board.add_card(card_at(0.0, 0.0));
        // 12 px at zoom 0.05 is 240 world units, wider than the card is tall
        let centre = egui::pos2(160.0, 120.0);
        assert_eq!(board.hit_test_cards(centre, 240.0, Some(card)), Some(CardHit::Body(card)));
        assert_eq!(
            board.hit_test_cards(egui::pos2(0.0, 0.0), 240.0, Some(card)),
            Some(CardHit::Handle(card, ResizeHandle::NW))
        );
    }

    #[test]
    fn elements_sort_by_layer_and_count_in_bounds() {
        let mut board = Board::new();
        let mut low = CanvasElement::new(
            ElementKind::Text { text: "low".into(), font_size: 16.0 },
            egui::pos2(-100.0, -100.0),
            Some(egui::vec2(50.0, 20.0)),
        );
        low.layer = -1;
        let high = CanvasElement::new(
            ElementKind::Text { text: "high".into(), font_size: 16.0 },
            egui::pos2(900.0, 900.0),
            None,
        );
        let high_id = board.add_element(high);
        let low_id = board.add_element(low);
        let order: Vec<_> = board.elements_by_layer().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![low_id, high_id]);

        board.add_card(card_at(0.0, 0.0));
        let bounds = board.content_bounds().unwrap();
        assert_eq!(bounds.min, egui::pos2(-100.0, -100.0));
        assert_eq!(bounds.max, egui::pos2(900.0, 900.0));
        assert_eq!(board.element_at(egui::pos2(901.0, 899.0), 2.0), Some(high_id));
    }

    #[test]
    fn update_card_applies_patch() {
        let mut board = Board::new();
        let id = board.add_card(card_at(0.0, 0.0));
        board
            .update_card(
                id,
                CardPatch {
                    title: Some("Zettel".into()),
                    tags: Some(vec!["idea".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        let card = board.card(id).unwrap();
        assert_eq!(card.title, "Zettel");
        assert_eq!(card.tags, vec!["idea".to_string()]);
        assert_eq!(card.color, CardColor::Purple);
    }
}
