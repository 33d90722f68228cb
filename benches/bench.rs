use chat262::wire::{Request, Response, Tag, WireText};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_accounts_response(n: usize) -> Response {
    Response::Accounts {
        status: 0,
        usernames: (0..n).map(|i| format!("user{i:06}").into_bytes()).collect(),
    }
}

fn sample_recv_txt_response(n: usize) -> Response {
    Response::RecvTxt {
        status: 0,
        texts: (0..n)
            .map(|i| WireText {
                tag: if i % 2 == 0 { Tag::You } else { Tag::Other },
                content: format!("message number {i}").into_bytes(),
            })
            .collect(),
    }
}

pub fn codec(c: &mut Criterion) {
    c.bench_function("encode_accounts_response_1000", |b| {
        let resp = sample_accounts_response(1000);
        b.iter(|| black_box(resp.encode_frame()))
    });

    c.bench_function("decode_accounts_response_1000", |b| {
        let resp = sample_accounts_response(1000);
        let frame = resp.encode_frame();
        let body = &frame[chat262::wire::HEADER_LEN..];
        b.iter(|| {
            black_box(
                Response::decode(chat262::wire::message::msg_type::ACCOUNTS_RESPONSE, body)
                    .unwrap(),
            )
        })
    });

    c.bench_function("encode_recv_txt_response_1000", |b| {
        let resp = sample_recv_txt_response(1000);
        b.iter(|| black_box(resp.encode_frame()))
    });

    c.bench_function("decode_recv_txt_response_1000", |b| {
        let resp = sample_recv_txt_response(1000);
        let frame = resp.encode_frame();
        let body = &frame[chat262::wire::HEADER_LEN..];
        b.iter(|| {
            black_box(
                Response::decode(chat262::wire::message::msg_type::RECV_TXT_RESPONSE, body)
                    .unwrap(),
            )
        })
    });

    c.bench_function("roundtrip_registration_request", |b| {
        let req = Request::Registration {
            username: b"a_moderately_long_username".to_vec(),
            password: b"a_moderately_long_password_too".to_vec(),
        };
        b.iter(|| {
            let frame = req.encode_frame();
            let body = &frame[chat262::wire::HEADER_LEN..];
            black_box(
                Request::decode(chat262::wire::message::msg_type::REGISTRATION_REQUEST, body)
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, codec);
criterion_main!(benches);
