use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput,
};
use disruptor_sequencer::{
    AtomicSequence, BusySpinWaitStrategy, SequenceBarrier, Sequenced, Sequencer,
    SingleProducerSequencer, WaitingStrategy, YieldingWaitStrategy,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BUFFER_SIZE: usize = 1024;
const ELEMENTS: usize = 64 * BUFFER_SIZE;

fn sequencer_hand_off<W: WaitingStrategy + 'static>(batch_size: usize) {
    let ring: Arc<Vec<AtomicI64>> = Arc::new((0..BUFFER_SIZE).map(|_| AtomicI64::new(0)).collect());
    let consumer_sequence = Arc::new(AtomicSequence::default());
    let mut sequencer = SingleProducerSequencer::new(BUFFER_SIZE, W::new()).unwrap();
    sequencer.add_gating_sequence(&consumer_sequence);
    let barrier = sequencer.create_sequence_barrier(&[]);

    let consumer = {
        let ring = ring.clone();
        let consumer_sequence = consumer_sequence.clone();
        thread::spawn(move || {
            let last = ELEMENTS as i64 - 1;
            while consumer_sequence.get() < last {
                let next = consumer_sequence.get() + 1;
                let available = barrier.wait_for(next).unwrap();
                for sequence in next..=available {
                    black_box(ring[sequence as usize & (BUFFER_SIZE - 1)].load(Ordering::Relaxed));
                }
                consumer_sequence.set(available);
            }
        })
    };

    let mut remaining = ELEMENTS;
    while remaining > 0 {
        let n = batch_size.min(remaining);
        let high = sequencer.next_n(n as i64).unwrap();
        let low = high - n as i64 + 1;
        for sequence in low..=high {
            ring[sequence as usize & (BUFFER_SIZE - 1)].store(sequence, Ordering::Relaxed);
        }
        sequencer.publish_range(low, high);
        remaining -= n;
    }

    consumer.join().unwrap();
}

fn throughput_single_producer_single_consumer(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_channel");
    group.throughput(Throughput::Elements(ELEMENTS as u64));
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(5));
    group.sampling_mode(SamplingMode::Flat);

    for batch_size in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                b.iter(|| {
                    let (tx, rx) = crossbeam_channel::bounded(BUFFER_SIZE);
                    let producer = thread::spawn(move || {
                        for chunk in (0..ELEMENTS).step_by(batch_size) {
                            let end = (chunk + batch_size).min(ELEMENTS);
                            let batch = (chunk..end).collect::<Vec<_>>();
                            tx.send(batch).unwrap();
                        }
                    });

                    let consumer = thread::spawn(move || {
                        while let Ok(batch) = rx.recv() {
                            black_box(batch);
                        }
                    });

                    let _ = producer.join();
                    let _ = consumer.join();
                });
            },
        );
    }
    group.finish();

    let mut group = c.benchmark_group("spsc_sequencer_busy_spin");
    group.throughput(Throughput::Elements(ELEMENTS as u64));
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(5));
    group.sampling_mode(SamplingMode::Flat);
    for batch_size in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| b.iter(|| sequencer_hand_off::<BusySpinWaitStrategy>(batch_size)),
        );
    }
    group.finish();

    let mut group = c.benchmark_group("spsc_sequencer_yielding");
    group.throughput(Throughput::Elements(ELEMENTS as u64));
    group.sampling_mode(SamplingMode::Flat);
    for batch_size in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| b.iter(|| sequencer_hand_off::<YieldingWaitStrategy>(batch_size)),
        );
    }
    group.finish();
}

fn claim_fast_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("claim");
    group.throughput(Throughput::Elements(1));

    group.bench_function("try_next_cached", |b| {
        let consumer_sequence = Arc::new(AtomicSequence::default());
        let mut sequencer =
            SingleProducerSequencer::new(BUFFER_SIZE, BusySpinWaitStrategy).unwrap();
        sequencer.add_gating_sequence(&consumer_sequence);
        b.iter(|| {
            let sequence = sequencer.try_next().unwrap();
            sequencer.publish(sequence);
            consumer_sequence.set(sequence);
            black_box(sequence)
        });
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10)).sample_size(10);
    targets =
        throughput_single_producer_single_consumer,
        claim_fast_path
}
criterion_main!(benches);
