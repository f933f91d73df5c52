use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use radius_proto::auth::{
    decrypt_user_password, encrypt_user_password, generate_request_authenticator,
};
use radius_proto::{Attribute, AttributeType, Code, Packet};

const SECRET: &[u8] = b"10testing";

fn access_request(num_attributes: usize) -> Packet {
    let req_auth = generate_request_authenticator();
    let mut packet = Packet::new(Code::AccessRequest, 1, req_auth);

    packet.add_attribute(
        Attribute::string(AttributeType::UserName.as_u8(), "xeraph")
            .expect("Failed to create User-Name attribute"),
    );

    let hidden = encrypt_user_password("qooguevara", SECRET, &req_auth)
        .expect("Failed to hide password");
    packet.add_attribute(
        Attribute::new(AttributeType::UserPassword.as_u8(), hidden)
            .expect("Failed to create User-Password attribute"),
    );

    for i in 0..num_attributes {
        packet.add_attribute(
            Attribute::string(AttributeType::CallingStationId.as_u8(), format!("station-{}", i))
                .expect("Failed to create attribute"),
        );
    }

    packet
}

fn access_accept(num_attributes: usize, request_auth: &[u8; 16]) -> Vec<u8> {
    let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
    for i in 0..num_attributes {
        packet.add_attribute(
            Attribute::string(AttributeType::ReplyMessage.as_u8(), format!("line {}", i))
                .expect("Failed to create Reply-Message"),
        );
    }
    packet
        .encode_response(request_auth, SECRET)
        .expect("Failed to encode response")
}

fn bench_request_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_encode");

    for num_attrs in [0, 5, 20] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_attrs),
            &num_attrs,
            |b, &num_attrs| {
                let mut packet = access_request(num_attrs);
                b.iter(|| packet.encode_request(black_box(SECRET)).expect("Failed to encode"));
            },
        );
    }

    group.finish();
}

fn bench_response_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_decode");
    let request_auth = [0x34u8; 16];

    for num_attrs in [0, 5, 20] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_attrs),
            &num_attrs,
            |b, &num_attrs| {
                let encoded = access_accept(num_attrs, &request_auth);
                b.iter(|| {
                    Packet::decode_response(black_box(&encoded), SECRET, &request_auth)
                        .expect("Failed to decode response")
                });
            },
        );
    }

    group.finish();
}

fn bench_password_hiding(c: &mut Criterion) {
    let mut group = c.benchmark_group("password_hiding");

    for (name, password) in [
        ("short", "test"),
        ("medium", "qooguevara-qooguevara"),
        ("long", "this_is_a_very_long_password_to_exercise_block_chaining"),
    ] {
        let req_auth = generate_request_authenticator();
        group.bench_function(BenchmarkId::new("hide", name), |b| {
            b.iter(|| encrypt_user_password(black_box(password), SECRET, &req_auth))
        });

        let hidden = encrypt_user_password(password, SECRET, &req_auth).expect("Failed to hide");
        group.bench_function(BenchmarkId::new("reveal", name), |b| {
            b.iter(|| decrypt_user_password(black_box(&hidden), SECRET, &req_auth))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_request_encode,
    bench_response_decode,
    bench_password_hiding
);
criterion_main!(benches);
