// Copyright (c) 2022-2023 The MobileCoin Foundation

use log::{debug, trace};

use lockbox_core::card::{Key, Transport, Uid, BLOCK_LEN, RAW_BLOCK_LEN};

use crate::{SimCard, SimError, CRC_A};

/// Faults injected by [SimReader]
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Faults {
    /// Fail card selection (UID read failure)
    pub select_error: bool,
    /// Card leaves the field after the first selection
    pub lost_on_reselect: bool,
    /// Fail writes to the provided block
    pub fail_write: Option<u8>,
    /// Fail reads from the provided block
    pub fail_read: Option<u8>,
    /// Corrupt the CRC of every read
    pub corrupt_crc: bool,
    /// Flip payload bits when writing the provided block
    pub corrupt_write: Option<u8>,
}

/// Operations observed by [SimReader]
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ReaderOp {
    Select,
    Authenticate(u8),
    Read(u8),
    Write(u8),
    Release,
}

/// Simulated reader with an optional card in the field
#[derive(Clone, Debug, Default)]
pub struct SimReader {
    card: Option<SimCard>,
    faults: Faults,
    selects: usize,
    ops: Vec<ReaderOp>,
}

impl SimReader {
    /// Create a reader with the provided card in the field
    pub fn new(card: SimCard) -> Self {
        Self {
            card: Some(card),
            ..Default::default()
        }
    }

    /// Create a reader with an empty field
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set faults to inject
    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Card currently in the field
    pub fn card(&self) -> Option<&SimCard> {
        self.card.as_ref()
    }

    /// Place a card in the field
    pub fn insert(&mut self, card: SimCard) {
        self.selects = 0;
        self.card = Some(card);
    }

    /// Remove the card from the field
    pub fn take_card(&mut self) -> Option<SimCard> {
        self.card.take()
    }

    /// Operations executed since creation
    pub fn ops(&self) -> &[ReaderOp] {
        &self.ops
    }

    /// Count of write operations executed
    pub fn writes(&self) -> usize {
        self.ops
            .iter()
            .filter(|o| matches!(o, ReaderOp::Write(_)))
            .count()
    }

    fn card_mut(&mut self, uid: Option<&Uid>) -> Result<&mut SimCard, SimError> {
        match &mut self.card {
            Some(c) if uid.map(|u| u == c.uid()).unwrap_or(true) => Ok(c),
            _ => Err(SimError::NoCard),
        }
    }
}

impl Transport for SimReader {
    type Error = SimError;

    fn select(&mut self) -> Result<Option<Uid>, Self::Error> {
        self.ops.push(ReaderOp::Select);
        self.selects += 1;

        if self.faults.select_error && self.card.is_some() {
            return Err(SimError::Injected);
        }

        if self.faults.lost_on_reselect && self.selects > 1 {
            self.card = None;
        }

        let uid = self.card.as_mut().map(|c| c.select());

        debug!("select: {:02x?}", uid.as_deref());

        Ok(uid)
    }

    fn authenticate(&mut self, uid: &Uid, block: u8, key: &Key) -> Result<(), Self::Error> {
        self.ops.push(ReaderOp::Authenticate(block));

        let r = self.card_mut(Some(uid))?.authenticate(block, key);

        trace!("authenticate block {}: {:?}", block, r);

        r
    }

    fn read(&mut self, block: u8) -> Result<[u8; RAW_BLOCK_LEN], Self::Error> {
        self.ops.push(ReaderOp::Read(block));

        if self.faults.fail_read == Some(block) {
            return Err(SimError::Injected);
        }

        let mut buff = self.card_mut(None)?.read(block)?;

        if self.faults.corrupt_crc {
            buff[BLOCK_LEN] ^= 0xff;
        }

        // Check CRC_A as the reader IC does
        let crc = u16::from_le_bytes([buff[BLOCK_LEN], buff[BLOCK_LEN + 1]]);
        if crc != CRC_A.checksum(&buff[..BLOCK_LEN]) {
            return Err(SimError::Crc);
        }

        Ok(buff)
    }

    fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        self.ops.push(ReaderOp::Write(block));

        if self.faults.fail_write == Some(block) {
            return Err(SimError::Injected);
        }

        let mut data = *data;
        if self.faults.corrupt_write == Some(block) {
            data[0] ^= 0x01;
        }

        self.card_mut(None)?.write(block, &data)
    }

    fn release(&mut self) {
        self.ops.push(ReaderOp::Release);

        if let Some(c) = &mut self.card {
            c.halt();
        }
    }
}
