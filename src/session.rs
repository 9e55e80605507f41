//! Packet-buffer session interfaces
//!
//! The rings never own packet memory. Packets live in a buffer shared with
//! session clients and are named by a [`PacketDescriptor`], an
//! `(offset, size)` pair into that buffer. The traits here are the narrow
//! capabilities the rings need from whoever manages that buffer.

/// Region inside the shared packet buffer
///
/// `(0, 0)` is the canonical invalid descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketDescriptor {
    offset: usize,
    size: usize,
}

impl PacketDescriptor {
    /// The canonical invalid descriptor
    pub const INVALID: Self = Self::new(0, 0);

    /// Create a descriptor for `size` bytes at `offset`
    #[must_use]
    pub const fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// Byte offset inside the packet buffer
    #[inline(always)]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether this is the canonical `(0, 0)` descriptor
    #[inline(always)]
    pub const fn is_invalid(&self) -> bool {
        self.offset == 0 && self.size == 0
    }

    /// Offset one past the last byte
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.size)
    }
}

/// Backing memory of a packet buffer
///
/// Used at construction time to size DMA regions identically and, for the
/// zero-copy pool, to learn the buffer's physical address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dataspace {
    /// Size of the buffer in bytes
    pub size: usize,
    /// CPU-local (virtual) base address
    pub local_addr: usize,
    /// Physical base address, `None` if the buffer is not DMA-reachable
    pub phys_addr: Option<u32>,
}

/// Access to a shared packet buffer
pub trait PacketBuffer {
    /// Whether `packet` names a region the session currently considers live
    fn packet_valid(&self, packet: &PacketDescriptor) -> bool;

    /// Bytes of `packet`, `None` if it lies outside the buffer
    fn packet_content(&self, packet: &PacketDescriptor) -> Option<&[u8]>;

    /// Mutable bytes of `packet`, `None` if it lies outside the buffer
    fn packet_content_mut(&mut self, packet: &PacketDescriptor) -> Option<&mut [u8]>;

    /// Backing memory of the buffer
    fn dataspace(&self) -> Dataspace;
}

/// Transmit side of a session: packets arrive from the client and are
/// acknowledged once the hardware is done with them.
pub trait TxSink: PacketBuffer {
    /// Hand ownership of `packet` back to the client
    fn acknowledge_packet(&mut self, packet: PacketDescriptor);
}

/// Receive side of a session: the driver allocates packets, lets the
/// hardware fill them and submits them to the client.
pub trait RxSource: PacketBuffer {
    /// Allocate a packet of `size` bytes, `None` if the buffer is exhausted
    fn alloc_packet(&mut self, size: usize) -> Option<PacketDescriptor>;

    /// Deliver a received frame to the client
    fn submit_packet(&mut self, packet: PacketDescriptor);

    /// Return an allocated packet without delivering it
    fn release_packet(&mut self, packet: PacketDescriptor);
}
