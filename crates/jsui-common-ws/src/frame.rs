// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Frame codec (RFC 6455 section 5.2).
//!
//! Decoding accepts masked and unmasked frames. Encoding emits a single FIN
//! frame; server frames are never masked, [`encode_masked_frame`] exists for
//! the client role (tests, tooling).

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::FrameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
	Continuation,
	Text,
	Binary,
	Close,
	Ping,
	Pong,
	Reserved(u8),
}

impl Opcode {
	pub fn from_u8(value: u8) -> Self {
		match value & 0x0F {
			0x0 => Opcode::Continuation,
			0x1 => Opcode::Text,
			0x2 => Opcode::Binary,
			0x8 => Opcode::Close,
			0x9 => Opcode::Ping,
			0xA => Opcode::Pong,
			other => Opcode::Reserved(other),
		}
	}

	pub fn as_u8(self) -> u8 {
		match self {
			Opcode::Continuation => 0x0,
			Opcode::Text => 0x1,
			Opcode::Binary => 0x2,
			Opcode::Close => 0x8,
			Opcode::Ping => 0x9,
			Opcode::Pong => 0xA,
			Opcode::Reserved(v) => v & 0x0F,
		}
	}

	pub fn is_control(self) -> bool {
		self.as_u8() & 0x8 != 0
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	pub fin: bool,
	pub opcode: Opcode,
	/// Unmasked payload.
	pub payload: Vec<u8>,
}

impl Frame {
	pub fn text(text: &str) -> Self {
		Self {
			fin: true,
			opcode: Opcode::Text,
			payload: text.as_bytes().to_vec(),
		}
	}

	/// Payload as UTF-8, lossy.
	pub fn text_payload(&self) -> String {
		String::from_utf8_lossy(&self.payload).into_owned()
	}
}

/// Read one frame.
///
/// Returns `Ok(None)` when the stream is closed cleanly before the first
/// header byte. A stream that ends inside a frame is [`FrameError::Truncated`].
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> Result<Option<Frame>, FrameError>
where
	R: AsyncRead + Unpin,
{
	let mut first = [0u8; 1];
	if reader.read(&mut first).await? == 0 {
		return Ok(None);
	}
	let b0 = first[0];
	let b1 = read_u8(reader).await?;

	let fin = b0 & 0x80 != 0;
	let opcode = Opcode::from_u8(b0);
	let masked = b1 & 0x80 != 0;

	let len = match b1 & 0x7F {
		126 => {
			let mut ext = [0u8; 2];
			read_exact(reader, &mut ext).await?;
			u64::from(u16::from_be_bytes(ext))
		}
		127 => {
			let mut ext = [0u8; 8];
			read_exact(reader, &mut ext).await?;
			u64::from_be_bytes(ext)
		}
		n => u64::from(n),
	};
	if len > max_payload as u64 {
		return Err(FrameError::TooLarge {
			len,
			max: max_payload,
		});
	}

	let mut mask = [0u8; 4];
	if masked {
		read_exact(reader, &mut mask).await?;
	}

	let mut payload = vec![0u8; len as usize];
	read_exact(reader, &mut payload).await?;
	if masked {
		apply_mask(&mut payload, mask);
	}

	Ok(Some(Frame {
		fin,
		opcode,
		payload,
	}))
}

/// Encode an unmasked FIN frame.
pub fn encode_frame(opcode: Opcode, payload: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(payload.len() + 10);
	out.push(0x80 | opcode.as_u8());
	push_length(&mut out, payload.len(), 0);
	out.extend_from_slice(payload);
	out
}

/// Encode a masked FIN frame, as a client would send it.
pub fn encode_masked_frame(opcode: Opcode, payload: &[u8], mask: [u8; 4]) -> Vec<u8> {
	let mut out = Vec::with_capacity(payload.len() + 14);
	out.push(0x80 | opcode.as_u8());
	push_length(&mut out, payload.len(), 0x80);
	out.extend_from_slice(&mask);
	let start = out.len();
	out.extend_from_slice(payload);
	apply_mask(&mut out[start..], mask);
	out
}

fn push_length(out: &mut Vec<u8>, len: usize, mask_bit: u8) {
	if len <= 125 {
		out.push(mask_bit | len as u8);
	} else if len <= usize::from(u16::MAX) {
		out.push(mask_bit | 126);
		out.extend_from_slice(&(len as u16).to_be_bytes());
	} else {
		out.push(mask_bit | 127);
		out.extend_from_slice(&(len as u64).to_be_bytes());
	}
}

fn apply_mask(buf: &mut [u8], mask: [u8; 4]) {
	for (i, byte) in buf.iter_mut().enumerate() {
		*byte ^= mask[i % 4];
	}
}

async fn read_u8<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u8, FrameError> {
	let mut b = [0u8; 1];
	read_exact(reader, &mut b).await?;
	Ok(b[0])
}

async fn read_exact<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
	match reader.read_exact(buf).await {
		Ok(_) => Ok(()),
		Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(FrameError::Truncated),
		Err(e) => Err(FrameError::Io(e)),
	}
}
