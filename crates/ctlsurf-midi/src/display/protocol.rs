//! Text display sysex framing for the supported surface families.

use crate::error::{Error, Result};
use crate::message::SurfaceMessage;
use serde::{Deserialize, Serialize};

/// Surface family whose text display a protocol drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayFamily {
    /// Mackie Control main unit, 2 lines of 56 characters.
    #[default]
    MackieMain,
    /// Mackie Control extender, same layout as the main unit.
    MackieExtender,
    /// HUI main display, 2 lines of 4 zones with 10 characters each.
    HuiMain,
    /// HUI channel scribble strips, 8 strips of 4 characters.
    HuiStrips,
}

/// Whether each changed cell or each changed line goes out as one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Granularity {
    #[default]
    PerCell,
    PerLine,
}

/// How the position byte after the header is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAddress {
    /// Character offset: `row * line_stride + column * cell_width`.
    CharOffset { line_stride: u8 },
    /// Cell number: `row * columns + column`.
    Index,
}

/// Header, geometry and addressing of one display protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextProtocol {
    pub header: Vec<u8>,
    pub rows: usize,
    pub columns: usize,
    pub cell_width: usize,
    pub address: CellAddress,
    pub granularity: Granularity,
}

impl TextProtocol {
    pub fn preset(family: DisplayFamily, granularity: Granularity) -> Self {
        match family {
            DisplayFamily::MackieMain => Self::mackie(0x14, granularity),
            DisplayFamily::MackieExtender => Self::mackie(0x15, granularity),
            DisplayFamily::HuiMain => Self {
                header: vec![0xF0, 0x00, 0x00, 0x66, 0x05, 0x00, 0x12],
                rows: 2,
                columns: 4,
                cell_width: 10,
                address: CellAddress::Index,
                granularity: Granularity::PerCell,
            },
            DisplayFamily::HuiStrips => Self {
                header: vec![0xF0, 0x00, 0x00, 0x66, 0x05, 0x00, 0x10],
                rows: 1,
                columns: 8,
                cell_width: 4,
                address: CellAddress::Index,
                granularity: Granularity::PerCell,
            },
        }
    }

    fn mackie(device_id: u8, granularity: Granularity) -> Self {
        Self {
            header: vec![0xF0, 0x00, 0x00, 0x66, device_id, 0x12],
            rows: 2,
            columns: 8,
            cell_width: 7,
            address: CellAddress::CharOffset { line_stride: 0x38 },
            granularity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.header.first() != Some(&0xF0) {
            return Err(Error::InvalidConfig(
                "display header must start with 0xF0".to_string(),
            ));
        }
        if self.rows == 0 || self.columns == 0 || self.cell_width == 0 {
            return Err(Error::InvalidConfig(format!(
                "display geometry {}x{}x{} must be non-empty",
                self.rows, self.columns, self.cell_width
            )));
        }
        if self.granularity == Granularity::PerLine && self.address == CellAddress::Index {
            return Err(Error::InvalidConfig(
                "line writes need character offset addressing".to_string(),
            ));
        }
        if self.cell_position(self.rows - 1, self.columns - 1) > 0x7F {
            return Err(Error::InvalidConfig(
                "display positions exceed one data byte".to_string(),
            ));
        }
        Ok(())
    }

    fn cell_position(&self, row: usize, column: usize) -> usize {
        match self.address {
            CellAddress::CharOffset { line_stride } => {
                row * usize::from(line_stride) + column * self.cell_width
            }
            CellAddress::Index => row * self.columns + column,
        }
    }

    /// One cell write. `text` must already be fitted to the cell width.
    pub fn encode_cell(&self, row: usize, column: usize, text: &str) -> SurfaceMessage {
        let position = self.cell_position(row, column) as u8;
        let mut payload = Vec::with_capacity(1 + text.len());
        payload.push(position);
        payload.extend_from_slice(text.as_bytes());
        SurfaceMessage::sysex(&self.header, &payload)
    }

    /// One full line write starting at the row's first character.
    pub fn encode_line(&self, row: usize, text: &str) -> SurfaceMessage {
        self.encode_cell(row, 0, text)
    }
}

impl Default for TextProtocol {
    fn default() -> Self {
        Self::preset(DisplayFamily::default(), Granularity::default())
    }
}
