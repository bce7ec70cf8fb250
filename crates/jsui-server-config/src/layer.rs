// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::sections::{
	HttpConfigLayer, LoggingConfigLayer, SecurityConfigLayer, SessionConfigLayer,
	ShutdownConfigLayer, WebSocketConfigLayer,
};

/// One source's partial view of the configuration. Later layers override earlier ones field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfigLayer {
	pub http: Option<HttpConfigLayer>,
	pub websocket: Option<WebSocketConfigLayer>,
	pub session: Option<SessionConfigLayer>,
	pub security: Option<SecurityConfigLayer>,
	pub shutdown: Option<ShutdownConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

macro_rules! merge_section {
	($self:ident, $other:ident, $field:ident) => {
		if let Some(incoming) = $other.$field {
			if let Some(existing) = $self.$field.as_mut() {
				existing.merge(incoming);
			} else {
				$self.$field = Some(incoming);
			}
		}
	};
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: Self) {
		merge_section!(self, other, http);
		merge_section!(self, other, websocket);
		merge_section!(self, other, session);
		merge_section!(self, other, security);
		merge_section!(self, other, shutdown);
		merge_section!(self, other, logging);
	}
}
