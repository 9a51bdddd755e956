//! Static dialogue scripts, one per confirmable intent

use super::{Destination, ScriptedAction, Slots};

/// Subject noun used when the oracle did not extract a name
pub const DEFAULT_SUBJECT: &str = "Peserta JKN";

/// What happens after the user accepts a proposal
#[derive(Debug, Clone, Copy)]
pub enum AcceptStep {
    /// Send a template and wait for the user to fill it in
    Template { prompt: &'static str },
    /// Explain what to prepare and redirect
    Guide { help: &'static str },
}

/// Dialogue script for one confirmable intent
#[derive(Debug)]
pub struct ActionScript {
    pub action: ScriptedAction,
    pub destination: Destination,
    pub proposal: fn(&Slots) -> String,
    pub on_accept: AcceptStep,
}

impl ScriptedAction {
    /// Look up the script for this action
    pub fn script(self) -> &'static ActionScript {
        match self {
            ScriptedAction::RegisterFktpQueue => &FKTP_QUEUE,
            ScriptedAction::RegisterFrtlQueue => &FRTL_QUEUE,
            ScriptedAction::UpdateProfile => &UPDATE_PROFILE,
            ScriptedAction::RegisterAccount => &REGISTER_ACCOUNT,
        }
    }
}

static FKTP_QUEUE: ActionScript = ActionScript {
    action: ScriptedAction::RegisterFktpQueue,
    destination: Destination::FktpQueue,
    proposal: fktp_proposal,
    on_accept: AcceptStep::Template {
        prompt: concat!(
            "Oke, saya kirim template isi form antrean FKTP ya.\n\n",
            "Silakan balas di chat dengan format seperti ini:\n",
            "Nama Peserta: (contoh: Budi Santoso)\n",
            "Poli: (contoh: POLI UMUM / POLI ANAK / POLI GIGI & MULUT)\n",
            "Tanggal Kunjungan: (contoh: 21-11-2025 atau \"besok pagi\")\n",
            "Keluhan: (contoh: batuk dan demam sejak 3 hari)\n\n",
            "Setelah Anda kirim jawaban dengan format di atas, saya akan arahkan ke halaman antrean FKTP."
        ),
    },
};

static FRTL_QUEUE: ActionScript = ActionScript {
    action: ScriptedAction::RegisterFrtlQueue,
    destination: Destination::FrtlQueue,
    proposal: frtl_proposal,
    on_accept: AcceptStep::Template {
        prompt: concat!(
            "Oke, saya kirim template antrean rumah sakit (FKRTL).\n\n",
            "Silakan balas di chat dengan format:\n",
            "Nama Peserta: ...\n",
            "Nama RS: ... (contoh: RSUD ODSK)\n",
            "Poli: ... (contoh: SARAF / JANTUNG / ANAK)\n",
            "Tanggal Kunjungan: ... (contoh: 25-11-2025)\n",
            "Dokter (jika sudah ditentukan): ...\n\n",
            "Setelah Anda kirim jawaban, saya akan arahkan ke halaman antrean FKRTL."
        ),
    },
};

static UPDATE_PROFILE: ActionScript = ActionScript {
    action: ScriptedAction::UpdateProfile,
    destination: Destination::DataChange,
    proposal: update_profile_proposal,
    on_accept: AcceptStep::Guide {
        help: concat!(
            "Nanti di halaman Perubahan Data Peserta, silakan pilih peserta yang datanya ingin diubah, ",
            "lalu pilih baris data yang sesuai (misalnya Nomor Handphone, Alamat, atau Faskes Tingkat I).\n",
            "Ikuti instruksi di layar sampai perubahan tersimpan."
        ),
    },
};

static REGISTER_ACCOUNT: ActionScript = ActionScript {
    action: ScriptedAction::RegisterAccount,
    destination: Destination::Registration,
    proposal: register_account_proposal,
    on_accept: AcceptStep::Guide {
        help: concat!(
            "Di halaman Registrasi, siapkan data berikut:\n",
            "- NIK sesuai KTP (16 digit).\n",
            "- Nama lengkap seperti di KTP.\n",
            "- Nomor HP aktif.\n",
            "- Email (jika ada).\n",
            "- Password yang aman (minimal 6 karakter, ada huruf besar, huruf kecil, dan angka)."
        ),
    },
};

fn subject(slots: &Slots) -> &str {
    slots.get("nama").unwrap_or(DEFAULT_SUBJECT)
}

fn fktp_proposal(slots: &Slots) -> String {
    format!(
        "Dari pertanyaan Anda, sepertinya Anda ingin daftar antrean di Faskes Tingkat Pertama \
         (puskesmas/klinik) untuk {}.\n\n\
         Saya bisa membantu mengarahkan ke halaman antrean FKTP dan menyiapkan template pengisian \
         form sehingga Anda lebih mudah mengisi datanya.\n\n\
         Apakah Anda ingin saya bantu seperti itu?\n\
         Balas \"ya\" jika setuju, atau \"tidak\" jika ingin mengisi sendiri.",
        subject(slots)
    )
}

fn frtl_proposal(slots: &Slots) -> String {
    format!(
        "Saya memahami Anda ingin daftar antrean di Rumah Sakit (Faskes Rujukan Tingkat Lanjut) \
         untuk {}.\n\n\
         Saya bisa bantu mengarahkan ke halaman antrean RS dan menyiapkan contoh pengisian tanggal \
         dan dokter.\n\n\
         Apakah Anda ingin saya bantu isi secara otomatis dalam bentuk template?\n\
         Balas \"ya\" atau \"tidak\".",
        subject(slots)
    )
}

fn update_profile_proposal(slots: &Slots) -> String {
    format!(
        "Anda ingin mengubah {} di data peserta JKN.\n\n\
         Saya bisa mengarahkan ke halaman Perubahan Data Peserta dan menyiapkan penjelasan data apa \
         saja yang perlu disiapkan.\n\
         Mau saya bantu? Balas \"ya\" atau \"tidak\".",
        field_label(slots.get("field").unwrap_or_default())
    )
}

fn register_account_proposal(_slots: &Slots) -> String {
    concat!(
        "Anda ingin mendaftar akun Mobile JKN.\n\n",
        "Saya bisa mengarahkan ke halaman registrasi dan menjelaskan data apa saja yang perlu Anda ",
        "siapkan sebelum mengisi form.\n",
        "Apakah Anda ingin saya bantu? Balas \"ya\" atau \"tidak\"."
    )
    .to_string()
}

/// Human label for the profile field the user wants to change.
///
/// Keywords are checked in order and the first hit wins.
pub fn field_label(field: &str) -> &'static str {
    const LABELS: [(&[&str], &str); 4] = [
        (&["faskes"], "Faskes Tingkat I"),
        (&["hp", "phone"], "Nomor Handphone"),
        (&["email"], "Email"),
        (&["alamat"], "Alamat"),
    ];

    let field = field.to_lowercase();
    LABELS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| field.contains(*k)))
        .map_or("data peserta", |(_, label)| *label)
}

pub const PAY_BILL_INFO: &str = concat!(
    "Anda ingin melihat atau membayar iuran JKN.\n",
    "Di versi web prototype ini, silakan buka menu Info Riwayat Pembayaran untuk melihat tagihan ",
    "yang sudah dibayar dan status pembayarannya."
);

pub const REACTIVATE_BPJS_INFO: &str = concat!(
    "Anda ingin mengaktifkan kembali kepesertaan JKN.\n",
    "Biasanya langkahnya: pastikan semua iuran sudah dilunasi, lalu cek status di menu kepesertaan ",
    "dalam beberapa hari kerja. Jika masih nonaktif, hubungi BPJS atau daftar antrean ke kantor cabang."
);

pub const LOGIN_INFO: &str = concat!(
    "Untuk login Mobile JKN, gunakan NIK/Email/No Kepesertaan dan password yang sudah terdaftar. ",
    "Di prototype web ini, kita mensimulasikan kondisi sudah login, jadi Anda langsung bisa mencoba ",
    "fitur-fitur demonya."
);
