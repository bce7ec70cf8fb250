// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Browser companion of the patch channel.
//!
//! The script opens a WebSocket to `/` on the page's own host (the session
//! cookie identifies the browser), applies `patch` messages by swap mode,
//! shows an offline banner while disconnected and reconnects with
//! exponential backoff capped at five seconds. A patch for a target that was
//! present earlier but is gone now is reported once with an `invalid`
//! message so the server can stop the task behind it.

/// Script body, without the surrounding `<script>` element.
pub const BOOT_SCRIPT: &str = r#"(function () {
	if (window.__jsui) { return; }
	var ws = null;
	var seen = {};
	var reported = {};
	var bannerId = 'jsui_offline_banner';
	var url = (location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/';

	function send(msg) {
		try {
			if (ws && ws.readyState === 1) { ws.send(JSON.stringify(msg)); }
		} catch (_) {}
	}

	function showOffline() {
		var el = document.getElementById(bannerId);
		if (!el) {
			el = document.createElement('div');
			el.id = bannerId;
			el.setAttribute('role', 'status');
			el.style.cssText = 'position:fixed;top:12px;left:12px;z-index:50;padding:8px 16px;border-radius:9999px;background:#ef4444;color:#fff;font:14px sans-serif';
			el.textContent = 'Offline. Trying to reconnect...';
			document.body.appendChild(el);
		} else {
			el.style.display = '';
		}
	}

	function hideOffline() {
		var el = document.getElementById(bannerId);
		if (el) { el.style.display = 'none'; }
	}

	function runScripts(html) {
		var tpl = document.createElement('template');
		tpl.innerHTML = html;
		var scripts = tpl.content.querySelectorAll('script');
		for (var i = 0; i < scripts.length; i++) {
			var s = document.createElement('script');
			s.textContent = scripts[i].textContent;
			document.body.appendChild(s);
		}
	}

	function handlePatch(msg) {
		try {
			var id = String(msg.id || '');
			var el = document.getElementById(id);
			if (!el) {
				if (seen[id] && !reported[id]) {
					reported[id] = true;
					send({ type: 'invalid', id: id });
				}
				return;
			}
			seen[id] = true;
			delete reported[id];
			var html = String(msg.html || '');
			if (msg.swap === 'outline') {
				el.outerHTML = html;
			} else if (msg.swap === 'append') {
				el.insertAdjacentHTML('beforeend', html);
			} else if (msg.swap === 'prepend') {
				el.insertAdjacentHTML('afterbegin', html);
			} else if (msg.swap !== 'none') {
				el.innerHTML = html;
			}
			runScripts(html);
		} catch (_) {}
	}

	function connect(delay) {
		setTimeout(function () {
			ws = new WebSocket(url);
			ws.onopen = function () {
				hideOffline();
				delay = 0;
				send({ type: 'ping' });
			};
			ws.onmessage = function (ev) {
				try {
					var m = JSON.parse(ev.data);
					if (m.type === 'patch') {
						handlePatch(m);
					}
				} catch (_) {}
			};
			ws.onerror = function () {
				try { ws.close(); } catch (_) {}
			};
			ws.onclose = function () {
				showOffline();
				connect(Math.min((delay || 125) * 2, 5000));
			};
		}, delay || 0);
	}

	window.__jsui = { handlePatch: handlePatch };

	document.addEventListener('DOMContentLoaded', function () {
		var nodes = document.querySelectorAll('[id]');
		for (var i = 0; i < nodes.length; i++) { seen[nodes[i].id] = true; }
	});

	if (document.readyState === 'loading') {
		document.addEventListener('DOMContentLoaded', function () { connect(0); });
	} else {
		connect(0);
	}
})();"#;

/// `<script>` element carrying [`BOOT_SCRIPT`], for the page head.
pub fn boot_script_tag() -> String {
	format!("<script>{BOOT_SCRIPT}</script>")
}
