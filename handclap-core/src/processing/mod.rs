pub mod frame_assembler;
pub mod frame_router;
pub mod pcm;
pub mod ring_buffer;
pub mod wav_format;
