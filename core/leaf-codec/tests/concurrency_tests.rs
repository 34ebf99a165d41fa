mod common;

use common::{codec, machine, reference};
use leaf_codec::{
    days_from, verify, BlockCipher, CipherCodec, CipherMode, CodeRendering,
    CompactActivationCode, MachineCode, Secret,
};
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn codec_types_are_send_and_sync() {
    assert_send_sync::<CipherCodec>();
    assert_send_sync::<BlockCipher>();
    assert_send_sync::<CompactActivationCode>();
    assert_send_sync::<MachineCode>();
    assert_send_sync::<Secret>();
}

#[test]
fn shared_cipher_codec_across_threads() {
    for mode in [CipherMode::Ecb, CipherMode::CbcFixedIv] {
        let codec = codec(mode, CodeRendering::Hex);
        let expected = codec
            .encode(&machine(), &days_from(&reference(), 30).unwrap())
            .to_string();

        thread::scope(|s| {
            let handles: Vec<_> = (0..8i64)
                .map(|i| {
                    let codec = &codec;
                    let expected = &expected;
                    s.spawn(move || {
                        let m = MachineCode::new(format!("MACHINE-{i}")).unwrap();
                        let expiry = days_from(&reference(), i + 1).unwrap();
                        for _ in 0..50 {
                            let code = codec.encode(&m, &expiry);
                            let payload = codec.decode(code.as_str()).unwrap();
                            assert_eq!(payload.machine_code, m);
                            assert_eq!(payload.expiry, expiry);

                            let scenario = codec
                                .encode(&machine(), &days_from(&reference(), 30).unwrap());
                            assert_eq!(scenario.as_str(), expected.as_str());
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    }
}

#[test]
fn compact_verify_across_threads() {
    thread::scope(|s| {
        for i in 0..8i64 {
            s.spawn(move || {
                let m = MachineCode::new(format!("DEVICE-{i}")).unwrap();
                let code = CompactActivationCode::from_days(&m, 19_000 + i).unwrap();
                assert!(verify(&code.to_string(), m.as_str()));
            });
        }
    });
}
