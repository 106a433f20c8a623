//! The closed opcode table.
//!
//! Every event starts with one of these words. The numbering is part of the
//! trace format and must never be reordered.

use crate::error::{DecodeError, WireResult};

macro_rules! opcodes {
    ($($variant:ident = $value:literal => $name:literal,)+) => {
        /// Discriminant identifying an event's kind and payload shape.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[repr(u32)]
        pub enum Opcode {
            $($variant = $value,)+
        }

        impl Opcode {
            /// Every opcode in wire order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Parses an opcode from its raw word.
            pub fn parse(value: u32) -> WireResult<Self> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(DecodeError::UnknownOpcode { value }),
                }
            }

            /// Snake-case name used in dumps and reports.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

opcodes! {
    InitSwapchain = 1 => "init_swapchain",
    DestroySwapchain = 2 => "destroy_swapchain",
    InitSampler = 3 => "init_sampler",
    DestroySampler = 4 => "destroy_sampler",
    InitResource = 5 => "init_resource",
    DestroyResource = 6 => "destroy_resource",
    InitResourceView = 7 => "init_resource_view",
    DestroyResourceView = 8 => "destroy_resource_view",
    InitPipeline = 9 => "init_pipeline",
    DestroyPipeline = 10 => "destroy_pipeline",
    InitPipelineLayout = 11 => "init_pipeline_layout",
    DestroyPipelineLayout = 12 => "destroy_pipeline_layout",
    CopyDescriptorTables = 13 => "copy_descriptor_tables",
    UpdateDescriptorTables = 14 => "update_descriptor_tables",
    InitQueryHeap = 15 => "init_query_heap",
    DestroyQueryHeap = 16 => "destroy_query_heap",
    GetQueryHeapResults = 17 => "get_query_heap_results",
    MapBufferRegion = 18 => "map_buffer_region",
    UnmapBufferRegion = 19 => "unmap_buffer_region",
    MapTextureRegion = 20 => "map_texture_region",
    UnmapTextureRegion = 21 => "unmap_texture_region",
    UpdateBufferRegion = 22 => "update_buffer_region",
    UpdateTextureRegion = 23 => "update_texture_region",
    Barrier = 24 => "barrier",
    BeginRenderPass = 25 => "begin_render_pass",
    EndRenderPass = 26 => "end_render_pass",
    BindRenderTargetsAndDepthStencil = 27 => "bind_render_targets_and_depth_stencil",
    BindPipeline = 28 => "bind_pipeline",
    BindPipelineStates = 29 => "bind_pipeline_states",
    BindViewports = 30 => "bind_viewports",
    BindScissorRects = 31 => "bind_scissor_rects",
    PushConstants = 32 => "push_constants",
    PushDescriptors = 33 => "push_descriptors",
    BindDescriptorTables = 34 => "bind_descriptor_tables",
    BindIndexBuffer = 35 => "bind_index_buffer",
    BindVertexBuffers = 36 => "bind_vertex_buffers",
    BindStreamOutputBuffers = 37 => "bind_stream_output_buffers",
    Draw = 38 => "draw",
    DrawIndexed = 39 => "draw_indexed",
    Dispatch = 40 => "dispatch",
    DrawOrDispatchIndirect = 41 => "draw_or_dispatch_indirect",
    CopyResource = 42 => "copy_resource",
    CopyBufferRegion = 43 => "copy_buffer_region",
    CopyBufferToTexture = 44 => "copy_buffer_to_texture",
    CopyTextureRegion = 45 => "copy_texture_region",
    CopyTextureToBuffer = 46 => "copy_texture_to_buffer",
    ResolveTextureRegion = 47 => "resolve_texture_region",
    ClearDepthStencilView = 48 => "clear_depth_stencil_view",
    ClearRenderTargetView = 49 => "clear_render_target_view",
    ClearUnorderedAccessViewUint = 50 => "clear_unordered_access_view_uint",
    ClearUnorderedAccessViewFloat = 51 => "clear_unordered_access_view_float",
    GenerateMipmaps = 52 => "generate_mipmaps",
    BeginQuery = 53 => "begin_query",
    EndQuery = 54 => "end_query",
    CopyQueryHeapResults = 55 => "copy_query_heap_results",
    ResetCommandList = 56 => "reset_command_list",
    CloseCommandList = 57 => "close_command_list",
    ExecuteCommandList = 58 => "execute_command_list",
    ExecuteSecondaryCommandList = 59 => "execute_secondary_command_list",
    Present = 60 => "present",
}

impl Opcode {
    /// Returns the raw opcode word.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Returns `true` for map and unmap events, whose payload comes from mapping state.
    #[must_use]
    pub const fn is_mapping(self) -> bool {
        matches!(
            self,
            Self::MapBufferRegion
                | Self::UnmapBufferRegion
                | Self::MapTextureRegion
                | Self::UnmapTextureRegion
        )
    }

    /// Returns `true` for events whose payload the recorder must derive from host
    /// state: mapping events and uploads sized by the payload calculator.
    #[must_use]
    pub const fn is_host_hook(self) -> bool {
        self.is_mapping()
            || matches!(
                self,
                Self::InitResource | Self::UpdateBufferRegion | Self::UpdateTextureRegion
            )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
