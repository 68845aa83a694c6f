// Copyright (c) 2022-2023 The MobileCoin Foundation

//! MFRC522 card transport

use core::fmt::Debug;

use anyhow::anyhow;
use crc::{Crc, CRC_16_ISO_IEC_14443_3_A};
use log::{debug, warn};
use mfrc522::{
    comm::{blocking::spi::SpiInterface, Interface},
    Initialized, Mfrc522,
};

use lockbox_core::card::{Key, Transport, Uid, BLOCK_LEN, RAW_BLOCK_LEN};

const CRC_A: Crc<u16> = Crc::<u16>::new(&CRC_16_ISO_IEC_14443_3_A);

fn err(e: impl Debug) -> anyhow::Error {
    anyhow!("mfrc522: {:?}", e)
}

/// MFRC522 reader, initialised on first use as it sits on the switched peripheral rail
pub struct Rc522<SPI> {
    spi: Option<SPI>,
    mfrc: Option<Mfrc522<SpiInterface<SPI>, Initialized>>,
    uid: Option<mfrc522::Uid>,
}

impl<SPI> Rc522<SPI>
where
    SpiInterface<SPI>: Interface,
    <SpiInterface<SPI> as Interface>::Error: Debug,
{
    pub fn new(spi: SPI) -> Self {
        Self {
            spi: Some(spi),
            mfrc: None,
            uid: None,
        }
    }

    fn reader(&mut self) -> anyhow::Result<&mut Mfrc522<SpiInterface<SPI>, Initialized>> {
        if let Some(spi) = self.spi.take() {
            let mut m = Mfrc522::new(SpiInterface::new(spi)).init().map_err(err)?;

            if let Ok(v) = m.version() {
                debug!("mfrc522 version: 0x{:02x}", v);
            }

            self.mfrc = Some(m);
        }

        self.mfrc
            .as_mut()
            .ok_or_else(|| anyhow!("mfrc522 initialisation failed"))
    }
}

impl<SPI> Transport for Rc522<SPI>
where
    SpiInterface<SPI>: Interface,
    <SpiInterface<SPI> as Interface>::Error: Debug,
{
    type Error = anyhow::Error;

    fn select(&mut self) -> Result<Option<Uid>, Self::Error> {
        let m = self.reader()?;

        // WUPA also wakes cards halted by a failed authentication
        let atqa = match m.wupa() {
            Ok(v) => v,
            Err(mfrc522::Error::Timeout) => return Ok(None),
            Err(e) => return Err(err(e)),
        };

        let uid = m.select(&atqa).map_err(err)?;
        let out = Uid::from_slice(uid.as_bytes()).map_err(|_| anyhow!("invalid uid length"))?;

        self.uid = Some(uid);

        Ok(Some(out))
    }

    fn authenticate(&mut self, _uid: &Uid, block: u8, key: &Key) -> Result<(), Self::Error> {
        let uid = self.uid.take().ok_or_else(|| anyhow!("no card selected"))?;
        let m = self.reader()?;

        let r = m.mf_authenticate(&uid, block, key.as_bytes()).map_err(err);
        self.uid = Some(uid);

        r
    }

    fn read(&mut self, block: u8) -> Result<[u8; RAW_BLOCK_LEN], Self::Error> {
        // CRC_A is checked by the driver and stripped, restore it for the engine
        let data = self.reader()?.mf_read(block).map_err(err)?;

        let mut buff = [0u8; RAW_BLOCK_LEN];
        buff[..BLOCK_LEN].copy_from_slice(&data);
        buff[BLOCK_LEN..].copy_from_slice(&CRC_A.checksum(&data).to_le_bytes());

        Ok(buff)
    }

    fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        self.reader()?.mf_write(block, *data).map_err(err)
    }

    fn release(&mut self) {
        self.uid = None;

        if let Some(m) = self.mfrc.as_mut() {
            if let Err(e) = m.hlta() {
                warn!("halt failed: {:?}", e);
            }
            if let Err(e) = m.stop_crypto1() {
                warn!("stop crypto failed: {:?}", e);
            }
        }
    }
}
