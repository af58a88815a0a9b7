//! `Input` domain: synthetic mouse events.

use serde::{Deserialize, Serialize};

use crate::message::{Command, Empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventKind {
	MousePressed,
	MouseReleased,
	MouseMoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseButton {
	None,
	Left,
}

/// `Input.dispatchMouseEvent`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMouseEvent {
	#[serde(rename = "type")]
	pub kind: MouseEventKind,
	pub x: f64,
	pub y: f64,
	pub button: MouseButton,
	pub click_count: u32,
}

impl Command for DispatchMouseEvent {
	const METHOD: &'static str = "Input.dispatchMouseEvent";
	type Response = Empty;
}
