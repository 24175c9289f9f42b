use crate::{
    cartridge::{Cartridge, LoadError},
    cpu::{Cpu, ExecutionError},
    input::Button,
    mmu::Mmu,
    ppu::{FRAME_CYCLES, SCREEN_HEIGHT, SCREEN_WIDTH},
};

pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
}

impl GameBoy {
    /// Parse the ROM image and build a machine in the post-boot state.
    pub fn new(rom: Vec<u8>) -> Result<Self, LoadError> {
        let cart = Cartridge::load(rom)?;
        Ok(Self::with_cartridge(cart))
    }

    pub fn with_cartridge(cart: Cartridge) -> Self {
        let mut mmu = Mmu::new();
        mmu.load_cart(cart);
        Self {
            cpu: Cpu::new(),
            mmu,
        }
    }

    /// Execute one instruction (or interrupt dispatch), then advance the
    /// timer and PPU by the cycles it consumed. Returns the cycle count.
    pub fn step(&mut self) -> Result<u32, ExecutionError> {
        let cycles = self.cpu.step(&mut self.mmu)?;
        self.mmu.tick(cycles);
        Ok(cycles)
    }

    /// Run until the PPU completes the current frame.
    ///
    /// While the LCD is disabled no VBlank ever fires, so a frame's worth
    /// of cycles is treated as a frame boundary to keep the host loop
    /// pacing.
    pub fn step_frame(&mut self) -> Result<(), ExecutionError> {
        let mut elapsed = 0u32;
        loop {
            elapsed += self.step()?;
            if self.mmu.ppu.frame_ready() {
                self.mmu.ppu.clear_frame_flag();
                return Ok(());
            }
            if !self.mmu.ppu.lcd_enabled() && elapsed >= FRAME_CYCLES {
                return Ok(());
            }
        }
    }

    /// The completed frame as 2-bit shades, one byte per pixel. Callers
    /// must not hold the borrow across `step_frame`.
    pub fn frame_buffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.mmu.ppu.framebuffer()
    }

    pub fn press_button(&mut self, button: Button) {
        self.mmu.press_button(button);
    }

    pub fn release_button(&mut self, button: Button) {
        self.mmu.release_button(button);
    }

    /// Return every subsystem to its boot-default state while preserving
    /// the loaded cartridge and boot ROM; the ROM is not re-parsed.
    pub fn reset(&mut self) {
        let cart = self.mmu.cart.take();
        let boot = self.mmu.boot_rom.take();
        self.cpu = Cpu::new();
        self.mmu = Mmu::new();
        if let Some(c) = cart {
            self.mmu.load_cart(c);
        }
        if let Some(b) = boot {
            self.mmu.load_boot_rom(b);
        }
    }

    /// External cartridge RAM as bytes, if the cartridge has any.
    pub fn save_ram(&self) -> Option<&[u8]> {
        self.mmu.cart.as_ref().and_then(|c| c.save_ram())
    }

    /// Restore external cartridge RAM from bytes.
    pub fn load_ram(&mut self, data: &[u8]) {
        if let Some(cart) = self.mmu.cart.as_mut() {
            cart.load_ram(data);
        }
    }
}
