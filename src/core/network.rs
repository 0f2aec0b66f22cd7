//! The backpropagation model: runtime state, propagation, learning and
//! persistence.
//!
//! Weights are ragged per receiver but stored in one flat arena indexed by
//! `(wbase[i], num_weights_to[i])`, with `first_weight_to[i]` giving the
//! sender index of the first weight. The momentum and gradient buffers
//! mirror the arena one to one.
//!
//! Unit order encodes the layering: inputs first, outputs last, and every
//! connection goes from a lower index to a higher one. The forward sweep
//! runs ascending and may read activations computed earlier in the same
//! sweep; the backward sweep runs descending so a receiver's delta is
//! final before its senders accumulate error from it.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BpError, Result};
use crate::patterns::PatternPairs;
use crate::prng::Prng;
use crate::spec::NetworkSpec;
use crate::storage;

/// Saturation cutoff of the legacy logistic implementation.
const LOGISTIC_CUTOFF: f64 = 15.935773;
const LOGISTIC_MAX: f64 = 0.99999988;
const LOGISTIC_MIN: f64 = 0.00000012;

/// Logistic squashing with the legacy saturation constants. Inputs past
/// the cutoff return the exact historical values rather than computed
/// ones, preserving bit-for-bit output compatibility.
pub fn logistic(x: f64) -> f64 {
    if x > LOGISTIC_CUTOFF {
        LOGISTIC_MAX
    } else if x < -LOGISTIC_CUTOFF {
        LOGISTIC_MIN
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

/// Activation propagation regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropagateMode {
    /// One ascending sweep; each unit settles instantly.
    Direct,
    /// Leaky-integrator settling over `ncycles` iterations per trial.
    Cascade,
}

/// Weight update cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grain {
    /// Accumulate gradients across the epoch, apply once at epoch end.
    Epoch,
    /// Apply after every trial.
    Pattern,
}

/// A loaded model instance. Hyperparameters are plain mutable fields; the
/// engine performs no range validation on them.
pub struct Network {
    // Hyperparameters.
    pub lrate: f64,
    pub momentum: f64,
    pub tmax: f64,
    pub ecrit: f64,
    pub nepochs: usize,
    pub ncycles: usize,
    pub cascade_rate: f64,
    pub learning: bool,
    pub mode: PropagateMode,
    pub grain: Grain,

    // Architecture (immutable once loaded).
    pub nunits: usize,
    pub ninputs: usize,
    pub noutputs: usize,
    pub first_weight_to: Vec<usize>,
    pub num_weights_to: Vec<usize>,
    wbase: Vec<usize>,

    // Counters and stats.
    pub epochno: usize,
    pub patno: usize,
    pub cycleno: usize,
    pub tss: f64,
    pub pss: f64,

    // Per-unit runtime state.
    pub netinput: Vec<f64>,
    pub activation: Vec<f64>,
    pub error: Vec<f64>,
    pub delta: Vec<f64>,
    /// Per output unit; `None` marks a "don't care" target.
    pub target: Vec<Option<f64>>,

    // Flat weight arena and its mirrors.
    pub weight: Vec<f64>,
    pub bias: Vec<f64>,
    pub wed: Vec<f64>,
    pub bed: Vec<f64>,
    pub dweight: Vec<f64>,
    pub dbias: Vec<f64>,

    // Patterns (raw target values, sentinel included).
    pub pattern_names: Vec<String>,
    pub input_patterns: Vec<Vec<f64>>,
    pub target_patterns: Vec<Vec<f64>>,

    spec: NetworkSpec,
    seed: u64,
    rng: Prng,
}

impl Network {
    /// Build a model from a parsed spec and draw initial weights.
    ///
    /// `nepochs` and `ecrit` overrides from the definitions section are
    /// applied here; `nunits`/`ninputs`/`noutputs`/`wrange` were already
    /// folded into the spec by the parser.
    pub fn from_spec(spec: NetworkSpec, seed: u64) -> Self {
        let nunits = spec.nunits;
        let noutputs = spec.noutputs;
        let nweights = spec.total_weights();

        let mut wbase = Vec::with_capacity(nunits);
        let mut base = 0usize;
        for &n in &spec.num_weights_to {
            wbase.push(base);
            base += n;
        }

        let mut net = Self {
            lrate: 0.5,
            momentum: 0.9,
            tmax: 1.0,
            ecrit: 0.0,
            nepochs: 500,
            ncycles: 50,
            cascade_rate: 0.05,
            learning: true,
            mode: PropagateMode::Direct,
            grain: Grain::Epoch,

            nunits,
            ninputs: spec.ninputs,
            noutputs,
            first_weight_to: spec.first_weight_to.clone(),
            num_weights_to: spec.num_weights_to.clone(),
            wbase,

            epochno: 0,
            patno: 0,
            cycleno: 0,
            tss: 0.0,
            pss: 0.0,

            netinput: vec![0.0; nunits],
            activation: vec![0.0; nunits],
            error: vec![0.0; nunits],
            delta: vec![0.0; nunits],
            target: vec![None; noutputs],

            weight: vec![0.0; nweights],
            bias: vec![0.0; nunits],
            wed: vec![0.0; nweights],
            bed: vec![0.0; nunits],
            dweight: vec![0.0; nweights],
            dbias: vec![0.0; nunits],

            pattern_names: Vec::new(),
            input_patterns: Vec::new(),
            target_patterns: Vec::new(),

            spec,
            seed,
            rng: Prng::new(seed),
        };

        if let Some(&v) = net.spec.definitions.get("nepochs") {
            net.nepochs = v as usize;
        }
        if let Some(&v) = net.spec.definitions.get("ecrit") {
            net.ecrit = v;
        }

        net.reset_weights();
        net
    }

    // ------------------------------------------------------------------
    // Initialization and reset
    // ------------------------------------------------------------------

    /// Redraw initial weights from the stored spec with the current seed
    /// and zero every piece of mutable runtime state.
    pub fn reset_weights(&mut self) {
        self.epochno = 0;
        self.cycleno = 0;
        self.tss = 0.0;
        self.pss = 0.0;

        self.rng = Prng::new(self.seed);

        // Draw order is fixed: receivers ascending, senders ascending
        // within a receiver, then biases by unit. `.` and unmapped codes
        // consume no draws.
        for i in 0..self.nunits {
            let base = self.wbase[i];
            for j in 0..self.num_weights_to[i] {
                self.weight[base + j] = self.draw(self.spec.wchar[i][j]);
            }
        }
        for i in 0..self.nunits {
            self.bias[i] = self.draw(self.spec.bchar[i]);
        }

        self.netinput.fill(0.0);
        self.activation.fill(0.0);
        self.error.fill(0.0);
        self.delta.fill(0.0);
        self.target.fill(None);
        self.zero_accumulators();
    }

    /// Pick a new seed from the model's own generator, then reset.
    pub fn newstart(&mut self) {
        self.seed = self.rng.next_u64();
        self.reset_weights();
    }

    /// Explicit reseed; the only externally triggered determinism reset.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Prng::new(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn draw(&mut self, code: char) -> f64 {
        if code == '.' {
            return 0.0;
        }
        // A letter with no constraint entry silently resolves to zero.
        let Some(&c) = self.spec.constraints.get(&code.to_ascii_lowercase()) else {
            return 0.0;
        };
        let wrange = self.spec.wrange;
        if !c.random {
            c.value
        } else if c.positive {
            wrange * self.rng.next_f64_01()
        } else if c.negative {
            wrange * (self.rng.next_f64_01() - 1.0)
        } else {
            wrange * (self.rng.next_f64_01() - 0.5)
        }
    }

    fn zero_accumulators(&mut self) {
        self.wed.fill(0.0);
        self.bed.fill(0.0);
        self.dweight.fill(0.0);
        self.dbias.fill(0.0);
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    /// Install a pattern set, all or nothing: if any vector disagrees with
    /// the architecture the whole set is rejected and the previous set
    /// stays in place.
    pub fn load_patterns(&mut self, pairs: PatternPairs) -> Result<()> {
        for (k, input) in pairs.inputs.iter().enumerate() {
            if input.len() != self.ninputs {
                return Err(BpError::DimensionMismatch(format!(
                    "pattern {} input width {} != ninputs {}",
                    pairs.names.get(k).map(String::as_str).unwrap_or("?"),
                    input.len(),
                    self.ninputs
                )));
            }
        }
        for (k, target) in pairs.targets.iter().enumerate() {
            if target.len() != self.noutputs {
                return Err(BpError::DimensionMismatch(format!(
                    "pattern {} target width {} != noutputs {}",
                    pairs.names.get(k).map(String::as_str).unwrap_or("?"),
                    target.len(),
                    self.noutputs
                )));
            }
        }
        self.pattern_names = pairs.names;
        self.input_patterns = pairs.inputs;
        self.target_patterns = pairs.targets;
        Ok(())
    }

    fn set_input(&mut self) {
        let input = &self.input_patterns[self.patno];
        self.activation[..self.ninputs].copy_from_slice(input);
    }

    /// Load the current pattern's target, applying the tmax clamp: 1.0
    /// maps to `tmax`, 0.0 to `1 - tmax`, anything else passes through.
    /// Negative raw values are the "don't care" sentinel.
    fn set_target(&mut self) {
        for j in 0..self.noutputs {
            let raw = self.target_patterns[self.patno][j];
            self.target[j] = if raw < 0.0 {
                None
            } else if raw == 1.0 {
                Some(self.tmax)
            } else if raw == 0.0 {
                Some(1.0 - self.tmax)
            } else {
                Some(raw)
            };
        }
    }

    // ------------------------------------------------------------------
    // Forward propagation
    // ------------------------------------------------------------------

    /// Direct mode: a single ascending sweep over non-input units.
    fn compute_output(&mut self) {
        for i in self.ninputs..self.nunits {
            let mut net = self.bias[i];
            let fwt = self.first_weight_to[i];
            let base = self.wbase[i];
            for j in 0..self.num_weights_to[i] {
                net += self.weight[base + j] * self.activation[fwt + j];
            }
            self.netinput[i] = net;
            self.activation[i] = logistic(net);
        }
    }

    /// Cascade cold start: seed net inputs and activations while ignoring
    /// contributions from input units, so the just-presented pattern has
    /// no instantaneous influence. Resets the cycle counter.
    fn init_output(&mut self) {
        self.cycleno = 0;
        for i in self.ninputs..self.nunits {
            let mut net = self.bias[i];
            let fwt = self.first_weight_to[i];
            let base = self.wbase[i];
            for j in 0..self.num_weights_to[i] {
                if fwt + j >= self.ninputs {
                    net += self.weight[base + j] * self.activation[fwt + j];
                }
            }
            self.netinput[i] = net;
            self.activation[i] = logistic(net);
        }
    }

    /// One settling iteration of the leaky integrator.
    fn cascade_cycle(&mut self) {
        let crate_ = self.cascade_rate;
        let drate = 1.0 - crate_;
        for i in self.ninputs..self.nunits {
            let mut newinput = self.bias[i];
            let fwt = self.first_weight_to[i];
            let base = self.wbase[i];
            for j in 0..self.num_weights_to[i] {
                newinput += self.weight[base + j] * self.activation[fwt + j];
            }
            self.netinput[i] = crate_ * newinput + drate * self.netinput[i];
            self.activation[i] = logistic(self.netinput[i]);
        }
    }

    fn cycle(&mut self) {
        for _ in 0..self.ncycles {
            self.cycleno += 1;
            self.cascade_cycle();
        }
    }

    /// Propagate the current input through the net in the selected mode.
    fn propagate(&mut self) {
        match self.mode {
            PropagateMode::Direct => self.compute_output(),
            PropagateMode::Cascade => {
                self.init_output();
                self.cycle();
            }
        }
    }

    // ------------------------------------------------------------------
    // Backward propagation
    // ------------------------------------------------------------------

    /// Compute output errors and backpropagate deltas in one descending
    /// sweep. A receiver's delta is final before any of its senders are
    /// visited, which the index ordering guarantees.
    fn compute_error(&mut self) {
        for i in self.ninputs..self.nunits - self.noutputs {
            self.error[i] = 0.0;
        }

        let first_out = self.nunits - self.noutputs;
        for j in 0..self.noutputs {
            self.error[first_out + j] = match self.target[j] {
                Some(t) => t - self.activation[first_out + j],
                None => 0.0,
            };
        }

        for i in (self.ninputs..self.nunits).rev() {
            let act = self.activation[i];
            let del = self.error[i] * act * (1.0 - act);
            self.delta[i] = del;

            let fwt = self.first_weight_to[i];
            let nw = self.num_weights_to[i];
            // Nothing to propagate if every sender is an input unit.
            if fwt + nw <= self.ninputs {
                continue;
            }
            let base = self.wbase[i];
            for j in 0..nw {
                let sender = fwt + j;
                if sender >= self.ninputs {
                    self.error[sender] += del * self.weight[base + j];
                }
            }
        }
    }

    /// Accumulate gradients; they persist across trials until an update
    /// applies them.
    fn compute_wed(&mut self) {
        for i in self.ninputs..self.nunits {
            let del = self.delta[i];
            self.bed[i] += del;
            let fwt = self.first_weight_to[i];
            let base = self.wbase[i];
            for j in 0..self.num_weights_to[i] {
                self.wed[base + j] += del * self.activation[fwt + j];
            }
        }
    }

    /// Momentum update: `dweight = lrate*wed + momentum*dweight`, applied
    /// in place, then the accumulators are zeroed. Shared by both grains.
    fn change_weights(&mut self) {
        for i in self.ninputs..self.nunits {
            self.dbias[i] = self.lrate * self.bed[i] + self.momentum * self.dbias[i];
            self.bias[i] += self.dbias[i];
            self.bed[i] = 0.0;

            let base = self.wbase[i];
            for j in 0..self.num_weights_to[i] {
                let k = base + j;
                self.dweight[k] = self.lrate * self.wed[k] + self.momentum * self.dweight[k];
                self.weight[k] += self.dweight[k];
                self.wed[k] = 0.0;
            }
        }
    }

    // ------------------------------------------------------------------
    // Stats and trials
    // ------------------------------------------------------------------

    /// Per-pattern sum of squares over the output units, accumulated into
    /// the epoch total. Don't-care outputs contribute nothing.
    fn sumstats(&mut self) {
        let first_out = self.nunits - self.noutputs;
        self.pss = 0.0;
        for j in 0..self.noutputs {
            if self.target[j].is_some() {
                let e = self.error[first_out + j];
                self.pss += e * e;
            }
        }
        self.tss += self.pss;
    }

    /// One trial: present the current pattern, propagate, compute error
    /// and statistics. The smallest indivisible unit of work.
    fn trial(&mut self) {
        self.set_input();
        self.set_target();
        self.propagate();
        self.compute_error();
        self.sumstats();
    }

    // ------------------------------------------------------------------
    // Training and evaluation
    // ------------------------------------------------------------------

    fn run_epochs(&mut self, permuted: bool) -> Result<()> {
        if self.input_patterns.is_empty() {
            return Err(BpError::NoPatterns);
        }
        let npatterns = self.input_patterns.len();

        // Gradient and momentum buffers start a learning run clean. An
        // evaluation pass must not touch them.
        if self.learning {
            self.zero_accumulators();
        }
        self.cycleno = 0;

        let mut order: Vec<usize> = (0..npatterns).collect();

        for _ in 0..self.nepochs {
            self.epochno += 1;
            if permuted {
                self.rng.shuffle(&mut order);
            }
            self.tss = 0.0;

            for k in 0..npatterns {
                self.patno = order[k];
                self.trial();

                if self.learning {
                    self.compute_wed();
                    if self.grain == Grain::Pattern {
                        self.change_weights();
                    }
                }
            }

            if self.learning && self.grain == Grain::Epoch {
                self.change_weights();
            }

            debug!(epoch = self.epochno, tss = self.tss, "epoch done");

            if self.ecrit > 0.0 && self.tss < self.ecrit {
                info!(
                    epoch = self.epochno,
                    tss = self.tss,
                    ecrit = self.ecrit,
                    "error criterion reached"
                );
                break;
            }
        }
        Ok(())
    }

    /// Train for `nepochs` epochs in fixed pattern order.
    pub fn train_sequential(&mut self) -> Result<()> {
        self.run_epochs(false)
    }

    /// Train for `nepochs` epochs, drawing a fresh pattern permutation
    /// each epoch.
    pub fn train_permuted(&mut self) -> Result<()> {
        self.run_epochs(true)
    }

    /// One sequential pass over all patterns with learning disabled.
    /// Weight, bias and momentum state are untouched, byte for byte.
    pub fn test_all(&mut self) -> Result<()> {
        let saved_learning = self.learning;
        let saved_nepochs = self.nepochs;
        self.learning = false;
        self.nepochs = 1;
        let result = self.run_epochs(false);
        self.learning = saved_learning;
        self.nepochs = saved_nepochs;
        result
    }

    /// Resolve a pattern reference: a zero-based in-range integer, else a
    /// case-insensitive name-prefix match (first match wins).
    pub fn pattern_index(&self, pattern_ref: &str) -> Result<usize> {
        let wanted = pattern_ref.trim();
        if let Ok(index) = wanted.parse::<usize>() {
            if index < self.input_patterns.len() {
                return Ok(index);
            }
        }
        let lowered = wanted.to_lowercase();
        for (idx, name) in self.pattern_names.iter().enumerate() {
            if name.to_lowercase().starts_with(&lowered) {
                return Ok(idx);
            }
        }
        Err(BpError::PatternReference(wanted.to_string()))
    }

    /// Run exactly one trial for the referenced pattern, no update and no
    /// epoch bookkeeping. Returns the resolved index.
    pub fn test_pattern(&mut self, pattern_ref: &str) -> Result<usize> {
        if self.input_patterns.is_empty() {
            return Err(BpError::NoPatterns);
        }
        let index = self.pattern_index(pattern_ref)?;
        self.patno = index;
        self.tss = 0.0;
        self.trial();
        Ok(index)
    }

    /// Activations of the output units.
    pub fn output_activations(&self) -> &[f64] {
        &self.activation[self.nunits - self.noutputs..]
    }

    pub fn current_pattern_name(&self) -> &str {
        self.pattern_names
            .get(self.patno)
            .map(String::as_str)
            .unwrap_or("")
    }

    // ------------------------------------------------------------------
    // Legacy weight file I/O
    // ------------------------------------------------------------------

    /// Write the flat legacy weight format: every weight, receiver-
    /// ascending then sender-ascending, followed by `nunits` bias values.
    /// One plain decimal per line, no header, no dimensions.
    pub fn save_weights_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for &v in &self.weight {
            writeln!(w, "{v:.6}")?;
        }
        for &v in &self.bias {
            writeln!(w, "{v:.6}")?;
        }
        Ok(())
    }

    pub fn save_weights(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = Vec::new();
        self.save_weights_to(&mut out)?;
        fs::write(path, out)?;
        Ok(())
    }

    /// Load the flat legacy weight format. The format carries no
    /// dimensions; a file written for a different topology silently
    /// misassigns values. Missing trailing values read as zero.
    pub fn load_weights_from<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let mut text = String::new();
        r.read_to_string(&mut text)?;
        let mut values = Vec::with_capacity(self.weight.len() + self.bias.len());
        for tok in text.split_whitespace() {
            let v: f64 = tok
                .parse()
                .map_err(|_| BpError::Format(format!("bad weight value {tok:?}")))?;
            values.push(v);
        }

        let nweights = self.weight.len();
        for (k, slot) in self.weight.iter_mut().enumerate() {
            *slot = values.get(k).copied().unwrap_or(0.0);
        }
        for (i, slot) in self.bias.iter_mut().enumerate() {
            *slot = values.get(nweights + i).copied().unwrap_or(0.0);
        }

        self.zero_accumulators();
        Ok(())
    }

    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.load_weights_from(&mut text.as_bytes())
    }

    // ------------------------------------------------------------------
    // Snapshot image (opt-in, self-describing persistence wrapper)
    // ------------------------------------------------------------------

    /// Serialize a versioned, chunked model image: spec, seed, generator
    /// state, hyperparameters and all learned state. Unlike the legacy
    /// weight format this is self-describing.
    pub fn save_image_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(storage::MAGIC)?;
        storage::write_u32_le(w, storage::VERSION_V1)?;

        let snap = Snapshot {
            spec: self.spec.clone(),
            seed: self.seed,
            rng_state: self.rng.state(),
            lrate: self.lrate,
            momentum: self.momentum,
            tmax: self.tmax,
            ecrit: self.ecrit,
            nepochs: self.nepochs,
            ncycles: self.ncycles,
            cascade_rate: self.cascade_rate,
            learning: self.learning,
            mode: self.mode,
            grain: self.grain,
            epochno: self.epochno,
            weight: self.weight.clone(),
            bias: self.bias.clone(),
            dweight: self.dweight.clone(),
            dbias: self.dbias.clone(),
        };
        let payload = serde_json::to_vec(&snap)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        storage::write_chunk_lz4(w, TAG_SNAPSHOT, &payload)
    }

    /// Load a model image. Unknown chunks are skipped for forward
    /// compatibility.
    pub fn load_image_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let magic = storage::read_exact::<8, _>(r)?;
        if &magic != storage::MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bad image magic"));
        }
        let version = storage::read_u32_le(r)?;
        if version != storage::VERSION_V1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unsupported image version",
            ));
        }

        let mut snap: Option<Snapshot> = None;
        loop {
            let (tag, len) = match storage::read_chunk_header(r) {
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            };
            if tag == TAG_SNAPSHOT {
                let payload = storage::read_chunk_lz4(r, len)?;
                snap = Some(
                    serde_json::from_slice(&payload)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
                );
            } else {
                let mut take = r.take(len as u64);
                io::copy(&mut take, &mut io::sink())?;
            }
        }

        let snap =
            snap.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing SNAP chunk"))?;

        let mut net = Network::from_spec(snap.spec, snap.seed);
        if snap.weight.len() != net.weight.len() || snap.bias.len() != net.bias.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "snapshot arrays disagree with spec connectivity",
            ));
        }
        net.lrate = snap.lrate;
        net.momentum = snap.momentum;
        net.tmax = snap.tmax;
        net.ecrit = snap.ecrit;
        net.nepochs = snap.nepochs;
        net.ncycles = snap.ncycles;
        net.cascade_rate = snap.cascade_rate;
        net.learning = snap.learning;
        net.mode = snap.mode;
        net.grain = snap.grain;
        net.epochno = snap.epochno;
        net.weight = snap.weight;
        net.bias = snap.bias;
        net.dweight = snap.dweight;
        net.dbias = snap.dbias;
        net.rng = Prng::from_state(snap.rng_state);
        Ok(net)
    }
}

const TAG_SNAPSHOT: [u8; 4] = *b"SNAP";

#[derive(Serialize, Deserialize)]
struct Snapshot {
    spec: NetworkSpec,
    seed: u64,
    rng_state: u64,
    lrate: f64,
    momentum: f64,
    tmax: f64,
    ecrit: f64,
    nepochs: usize,
    ncycles: usize,
    cascade_rate: f64,
    learning: bool,
    mode: PropagateMode,
    grain: Grain,
    epochno: usize,
    weight: Vec<f64>,
    bias: Vec<f64>,
    dweight: Vec<f64>,
    dbias: Vec<f64>,
}
