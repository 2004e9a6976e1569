// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

pub mod best_overlap;
pub mod error;
pub mod layout_io;
pub mod optimize;
pub mod overlap_cache;
pub mod populate;
pub mod read_info;
pub mod speed_counter;
pub mod tig_vector;
pub mod unitig;
pub use core::mem::MaybeUninit;
pub use libc::{getrusage, rusage, RUSAGE_SELF};

#[derive(Copy, Clone, Debug)]
pub struct Parameters {
    pub nthreads: u32,
    // position refinement
    pub max_iterations: u32,
    pub converge_threshold: f64,
    // minimum number of unitigs / reads handed to a worker at once
    pub tig_block_size: usize,
    pub read_block_size: usize,
    pub verbose: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            nthreads: 1,
            max_iterations: 5,
            converge_threshold: 0.005,
            tig_block_size: 10,
            read_block_size: 100,
            verbose: false,
        }
    }
}

#[allow(dead_code)]
pub fn log_resource(msg: &str, data: &mut rusage) -> (u64, u64, u64) {
    let _res = unsafe { getrusage(RUSAGE_SELF, data) };
    log::info!(
        "{} : (maxRSS, utime, stime): {} {} {}",
        msg,
        data.ru_maxrss,
        data.ru_utime.tv_sec,
        data.ru_stime.tv_sec
    );

    (
        data.ru_maxrss as u64,
        data.ru_utime.tv_sec as u64,
        data.ru_stime.tv_sec as u64,
    )
}
